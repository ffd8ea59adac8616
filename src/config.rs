use std::path::{Path, PathBuf};

pub const DATA_DIR_VAR: &str = "RENTFLIX_DATA_DIR";

pub struct Config {
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Config {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Config {
            data_dir: data_dir.as_ref().to_owned(),
        }
    }

    /// Uses `RENTFLIX_DATA_DIR` if set, otherwise `data/` under the current
    /// working directory.
    pub fn from_env() -> std::io::Result<Self> {
        match std::env::var_os(DATA_DIR_VAR) {
            Some(dir) => Ok(Config::new(dir)),
            None => Ok(Config::new(std::env::current_dir()?.join("data"))),
        }
    }

    pub fn users_file(&self) -> PathBuf {
        self.data_dir.join("users.csv")
    }

    pub fn admins_file(&self) -> PathBuf {
        self.data_dir.join("admins.csv")
    }

    pub fn movies_file(&self) -> PathBuf {
        self.data_dir.join("movies.csv")
    }

    pub fn addresses_file(&self) -> PathBuf {
        self.data_dir.join("addresses.csv")
    }

    pub fn loyalty_file(&self) -> PathBuf {
        self.data_dir.join("loyalty.csv")
    }

    pub fn orders_file(&self) -> PathBuf {
        self.data_dir.join("orders.csv")
    }
}
