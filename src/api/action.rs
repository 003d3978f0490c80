//! # 动作目录
//!
//! API 的封闭动作枚举。每个动作声明自己的授权等级与写锁域，
//! 调度器据此做统一的权限检查与互斥控制，未知动作一律拒绝。

use std::fmt;

/// 全部受理的 API 动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // 用户与会话
    AuthenticateUser,
    ChangeUserPassword,
    GetCurrentSession,
    LogoutUser,
    GetAllUsers,
    GetUserByAccount,
    AddUser,
    UpdateUser,
    DeleteUser,
    SendTemporaryPassword,
    // 工程
    GetAllProjects,
    GetActiveProjects,
    UpdateProjectInfo,
    GetUnfilledProjectsForTomorrow,
    // 日志
    SubmitDailyLog,
    GetLastLogForProject,
    GetDailySummaryReport,
    UpdateDailySummaryLog,
    GetPreviousDayLog,
    GetUnfilledCount,
    GetFilledDates,
    GetDailyLogStatus,
    GetFillerReminders,
    // 巡检人员
    GetAllInspectors,
    AddInspector,
    UpdateInspector,
    // 假日行事历
    CheckHolidayFilledStatus,
    BatchSubmitHolidayLogs,
    CheckHoliday,
    GetMonthHolidays,
    // 其他
    GetAllDepartments,
    GetDisasterTypes,
    SaveCustomDisasterType,
    GenerateTbmKy,
    TestTbmKyPermissions,
    LogModification,
}

/// 动作的授权等级
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    /// 无需会话
    Public,
    /// 需要有效会话
    User,
    /// 需要管理员或联络员会话
    AdminOrLiaison,
    /// 仅限管理员会话
    Admin,
}

/// 写操作的互斥域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockDomain {
    Users,
    Projects,
    Logs,
    Inspectors,
    Holidays,
    DisasterTypes,
}

impl LockDomain {
    /// 全部互斥域，锁表按此初始化
    pub const ALL: [Self; 6] = [
        Self::Users,
        Self::Projects,
        Self::Logs,
        Self::Inspectors,
        Self::Holidays,
        Self::DisasterTypes,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Projects => "projects",
            Self::Logs => "logs",
            Self::Inspectors => "inspectors",
            Self::Holidays => "holidays",
            Self::DisasterTypes => "disaster_types",
        }
    }
}

impl fmt::Display for LockDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Action {
    /// 解析动作名，未收录的名称回传 `None`
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let action = match name {
            "authenticateUser" => Self::AuthenticateUser,
            "changeUserPassword" => Self::ChangeUserPassword,
            "getCurrentSession" => Self::GetCurrentSession,
            "logoutUser" => Self::LogoutUser,
            "getAllUsers" => Self::GetAllUsers,
            "getUserByAccount" => Self::GetUserByAccount,
            "addUser" => Self::AddUser,
            "updateUser" => Self::UpdateUser,
            "deleteUser" => Self::DeleteUser,
            "sendTemporaryPassword" => Self::SendTemporaryPassword,
            "getAllProjects" => Self::GetAllProjects,
            "getActiveProjects" => Self::GetActiveProjects,
            "updateProjectInfo" => Self::UpdateProjectInfo,
            "getUnfilledProjectsForTomorrow" => Self::GetUnfilledProjectsForTomorrow,
            "submitDailyLog" => Self::SubmitDailyLog,
            "getLastLogForProject" => Self::GetLastLogForProject,
            "getDailySummaryReport" => Self::GetDailySummaryReport,
            "updateDailySummaryLog" => Self::UpdateDailySummaryLog,
            "getPreviousDayLog" => Self::GetPreviousDayLog,
            "getUnfilledCount" => Self::GetUnfilledCount,
            "getFilledDates" => Self::GetFilledDates,
            "getDailyLogStatus" => Self::GetDailyLogStatus,
            "getFillerReminders" => Self::GetFillerReminders,
            "getAllInspectors" => Self::GetAllInspectors,
            "addInspector" => Self::AddInspector,
            "updateInspector" => Self::UpdateInspector,
            "checkHolidayFilledStatus" => Self::CheckHolidayFilledStatus,
            "batchSubmitHolidayLogs" => Self::BatchSubmitHolidayLogs,
            "checkHoliday" => Self::CheckHoliday,
            "getMonthHolidays" => Self::GetMonthHolidays,
            "getAllDepartments" => Self::GetAllDepartments,
            "getDisasterTypes" => Self::GetDisasterTypes,
            "saveCustomDisasterType" => Self::SaveCustomDisasterType,
            "generateTBMKY" => Self::GenerateTbmKy,
            "testTBMKYPermissions" => Self::TestTbmKyPermissions,
            "logModification" => Self::LogModification,
            _ => return None,
        };
        Some(action)
    }

    /// 动作的对外名称，与前端调用一致
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AuthenticateUser => "authenticateUser",
            Self::ChangeUserPassword => "changeUserPassword",
            Self::GetCurrentSession => "getCurrentSession",
            Self::LogoutUser => "logoutUser",
            Self::GetAllUsers => "getAllUsers",
            Self::GetUserByAccount => "getUserByAccount",
            Self::AddUser => "addUser",
            Self::UpdateUser => "updateUser",
            Self::DeleteUser => "deleteUser",
            Self::SendTemporaryPassword => "sendTemporaryPassword",
            Self::GetAllProjects => "getAllProjects",
            Self::GetActiveProjects => "getActiveProjects",
            Self::UpdateProjectInfo => "updateProjectInfo",
            Self::GetUnfilledProjectsForTomorrow => "getUnfilledProjectsForTomorrow",
            Self::SubmitDailyLog => "submitDailyLog",
            Self::GetLastLogForProject => "getLastLogForProject",
            Self::GetDailySummaryReport => "getDailySummaryReport",
            Self::UpdateDailySummaryLog => "updateDailySummaryLog",
            Self::GetPreviousDayLog => "getPreviousDayLog",
            Self::GetUnfilledCount => "getUnfilledCount",
            Self::GetFilledDates => "getFilledDates",
            Self::GetDailyLogStatus => "getDailyLogStatus",
            Self::GetFillerReminders => "getFillerReminders",
            Self::GetAllInspectors => "getAllInspectors",
            Self::AddInspector => "addInspector",
            Self::UpdateInspector => "updateInspector",
            Self::CheckHolidayFilledStatus => "checkHolidayFilledStatus",
            Self::BatchSubmitHolidayLogs => "batchSubmitHolidayLogs",
            Self::CheckHoliday => "checkHoliday",
            Self::GetMonthHolidays => "getMonthHolidays",
            Self::GetAllDepartments => "getAllDepartments",
            Self::GetDisasterTypes => "getDisasterTypes",
            Self::SaveCustomDisasterType => "saveCustomDisasterType",
            Self::GenerateTbmKy => "generateTBMKY",
            Self::TestTbmKyPermissions => "testTBMKYPermissions",
            Self::LogModification => "logModification",
        }
    }

    /// 动作的授权等级
    ///
    /// `getDailySummaryReport` 允许无会话访问，访客视角由报表服务自行遮罩。
    #[must_use]
    pub const fn access_level(self) -> AccessLevel {
        match self {
            Self::AuthenticateUser
            | Self::GetCurrentSession
            | Self::LogoutUser
            | Self::SendTemporaryPassword
            | Self::GetDailySummaryReport => AccessLevel::Public,

            Self::GetAllUsers
            | Self::GetUserByAccount
            | Self::AddUser
            | Self::UpdateUser
            | Self::DeleteUser
            | Self::UpdateProjectInfo
            | Self::AddInspector
            | Self::UpdateInspector
            | Self::BatchSubmitHolidayLogs
            | Self::SaveCustomDisasterType
            | Self::LogModification => AccessLevel::Admin,

            Self::UpdateDailySummaryLog => AccessLevel::AdminOrLiaison,

            Self::ChangeUserPassword
            | Self::GetAllProjects
            | Self::GetActiveProjects
            | Self::GetUnfilledProjectsForTomorrow
            | Self::SubmitDailyLog
            | Self::GetLastLogForProject
            | Self::GetPreviousDayLog
            | Self::GetUnfilledCount
            | Self::GetFilledDates
            | Self::GetDailyLogStatus
            | Self::GetFillerReminders
            | Self::GetAllInspectors
            | Self::CheckHolidayFilledStatus
            | Self::CheckHoliday
            | Self::GetMonthHolidays
            | Self::GetAllDepartments
            | Self::GetDisasterTypes
            | Self::GenerateTbmKy
            | Self::TestTbmKyPermissions => AccessLevel::User,
        }
    }

    /// 动作需要的写锁域，只读动作回传 `None`
    ///
    /// 批次假日填报同时写日志与假日表，整批持有日志域锁。
    #[must_use]
    pub const fn lock_domain(self) -> Option<LockDomain> {
        match self {
            Self::AuthenticateUser
            | Self::ChangeUserPassword
            | Self::LogoutUser
            | Self::AddUser
            | Self::UpdateUser
            | Self::DeleteUser
            | Self::SendTemporaryPassword => Some(LockDomain::Users),

            Self::UpdateProjectInfo => Some(LockDomain::Projects),

            Self::SubmitDailyLog
            | Self::UpdateDailySummaryLog
            | Self::BatchSubmitHolidayLogs
            | Self::LogModification => Some(LockDomain::Logs),

            Self::AddInspector | Self::UpdateInspector => Some(LockDomain::Inspectors),

            Self::SaveCustomDisasterType => Some(LockDomain::DisasterTypes),

            Self::GetCurrentSession
            | Self::GetAllUsers
            | Self::GetUserByAccount
            | Self::GetAllProjects
            | Self::GetActiveProjects
            | Self::GetUnfilledProjectsForTomorrow
            | Self::GetLastLogForProject
            | Self::GetDailySummaryReport
            | Self::GetPreviousDayLog
            | Self::GetUnfilledCount
            | Self::GetFilledDates
            | Self::GetDailyLogStatus
            | Self::GetFillerReminders
            | Self::GetAllInspectors
            | Self::CheckHolidayFilledStatus
            | Self::CheckHoliday
            | Self::GetMonthHolidays
            | Self::GetAllDepartments
            | Self::GetDisasterTypes
            | Self::GenerateTbmKy
            | Self::TestTbmKyPermissions => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
