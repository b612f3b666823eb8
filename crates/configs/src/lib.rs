use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    #[serde(default = "default_public_port")]
    pub public_port: u16,
    #[serde(default = "default_manage_port")]
    pub manage_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            public_port: default_public_port(),
            manage_port: default_manage_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            assets_dir: default_assets_dir(),
        }
    }
}

fn default_public_port() -> u16 {
    5000
}
fn default_manage_port() -> u16 {
    5001
}
fn default_data_dir() -> String {
    "data".into()
}
fn default_assets_dir() -> String {
    "assets".into()
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        // 存储路径支持环境变量覆盖，便于两个服务共用同一份数据目录
        self.storage.normalize_from_env();
        self.storage.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "0.0.0.0".to_string();
        }
        if self.public_port == 0 || self.manage_port == 0 {
            return Err(anyhow!("server 端口必须在 1..=65535 范围内"));
        }
        if self.public_port == self.manage_port {
            return Err(anyhow!("public_port 与 manage_port 不能相同"));
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn normalize_from_env(&mut self) {
        if let Ok(dir) = std::env::var("DATA_DIR") {
            if !dir.trim().is_empty() {
                self.data_dir = dir;
            }
        }
        if let Ok(dir) = std::env::var("ASSETS_DIR") {
            if !dir.trim().is_empty() {
                self.assets_dir = dir;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir 不能为空"));
        }
        if self.assets_dir.trim().is_empty() {
            return Err(anyhow!("storage.assets_dir 不能为空"));
        }
        Ok(())
    }

    /// 商家表（`vendor,weight`）。
    pub fn vendor_file(&self) -> PathBuf {
        Path::new(&self.data_dir).join("db.csv")
    }

    /// 点餐记录表（`date,order,price,rate,image`）。
    pub fn meal_file(&self) -> PathBuf {
        Path::new(&self.data_dir).join("db_meal.csv")
    }

    /// 上传图片目录。
    pub fn img_dir(&self) -> PathBuf {
        Path::new(&self.data_dir).join("img")
    }
}
