use std::time::Duration;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 成绩查询入口
    pub base_url: String,
    /// 学位参数（degree=）
    pub degree: String,
    /// 同时进行的请求数量（连接池上限）
    pub max_concurrent_requests: usize,
    /// 单个请求的超时时间（秒）
    pub request_timeout_secs: u64,
    /// 考试代码目录文件（TOML）
    pub exam_codes_file: String,
    /// 学院代码对照表文件
    pub college_codes_file: String,
    /// 持久化存储目录
    pub store_dir: String,
    pub user_agent: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://results.jntuh.ac.in/resultAction".to_string(),
            degree: "btech".to_string(),
            max_concurrent_requests: 20,
            request_timeout_secs: 20,
            exam_codes_file: "config/exam_codes.toml".to_string(),
            college_codes_file: "config/colleges.html".to_string(),
            store_dir: "results_store".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            base_url: std::env::var("RESULTS_BASE_URL").unwrap_or(default.base_url),
            degree: std::env::var("DEGREE").unwrap_or(default.degree),
            max_concurrent_requests: std::env::var("MAX_CONCURRENT_REQUESTS").ok().and_then(|v| v.parse().ok()).filter(|n| *n > 0).unwrap_or(default.max_concurrent_requests),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            exam_codes_file: std::env::var("EXAM_CODES_FILE").unwrap_or(default.exam_codes_file),
            college_codes_file: std::env::var("COLLEGE_CODES_FILE").unwrap_or(default.college_codes_file),
            store_dir: std::env::var("STORE_DIR").unwrap_or(default.store_dir),
            user_agent: std::env::var("USER_AGENT").unwrap_or(default.user_agent),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
