use thiserror::Error;

/// 应用程序错误类型
///
/// 只有"无可用成绩单"这一终态会以 [`AppError::NotFound`] 向外传播，
/// 单个请求 / 单个页面的失败在各自层内被吸收（见 [`FetchFailure`]、[`ParseFailure`]）。
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// HTTP 客户端构建失败
    #[error("HTTP客户端初始化失败: {0}")]
    HttpClient(#[from] reqwest::Error),
    /// 准考证号格式非法
    #[error("准考证号非法: '{0}'")]
    InvalidHallTicket(String),
    /// 聚合结束后没有可用的成绩单
    #[error("未找到成绩 ({hall_ticket}): {reason}")]
    NotFound {
        hall_ticket: String,
        reason: IncompleteRecord,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 考试代码目录中没有任何学期
    #[error("考试代码目录为空: {path}")]
    EmptyCatalog { path: String },
    /// 没有配置任何结果变体
    #[error("结果变体列表为空: {path}")]
    NoVariants { path: String },
    /// 同一学期标签出现多次
    #[error("学期 '{label}' 在考试代码目录中重复出现: {path}")]
    DuplicateSemester { label: String, path: String },
    /// 变体的查询模板不合法
    #[error("变体 '{name}' 的查询模板缺少占位符 {placeholder}")]
    InvalidVariant {
        name: String,
        placeholder: &'static str,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// JSON 序列化 / 反序列化失败
    #[error("JSON处理失败 ({path}): {source}")]
    JsonFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 单个抓取任务的失败原因，会被吸收为"页面缺失"
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("请求超时")]
    Timeout,
    #[error("连接失败: {0}")]
    Connect(String),
    #[error("HTTP状态码 {0}")]
    Status(u16),
    #[error("传输错误: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchFailure::Timeout
        } else if err.is_connect() {
            FetchFailure::Connect(err.to_string())
        } else if let Some(status) = err.status() {
            FetchFailure::Status(status.as_u16())
        } else {
            FetchFailure::Transport(err.to_string())
        }
    }
}

/// 页面通过了表格数量检查但结构无法识别
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    /// 科目表表头中没有任何可识别的列名
    #[error("无法识别科目表表头")]
    UnrecognizedHeader,
    /// 同一列名在表头中出现多次
    #[error("科目表表头存在歧义: {0}")]
    AmbiguousHeader(&'static str),
    /// 缺少必需列
    #[error("科目表缺少必需列: {0}")]
    MissingRequiredColumn(&'static str),
}

/// 聚合结束后成绩单不完整的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IncompleteRecord {
    #[error("没有任何学期包含科目")]
    NoSemesters,
    #[error("未能解析到学生姓名")]
    MissingName,
}

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 是否为"未找到成绩"
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound { .. })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
