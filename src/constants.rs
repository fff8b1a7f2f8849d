// Constants module for shared string constants

pub const SETTINGS_FILE: &str = "ardl.toml";
pub const DIR_ENV: &str = "ARDL_DIR";
pub const TOKEN_ENV: &str = "ARISTA_TOKEN";

pub const SESSION_URL: &str = "https://www.arista.com/custom_data/api/cvp/getSessionCode/";
pub const FOLDER_TREE_URL: &str = "https://www.arista.com/custom_data/api/cvp/getFolderTree/";
pub const DOWNLOAD_LINK_URL: &str = "https://www.arista.com/custom_data/api/cvp/getDownloadLink/";

pub const DEFAULT_OUTPUT_DIR: &str = ".";
pub const DEFAULT_PARALLEL_DOWNLOADS: usize = 2;
pub const DEFAULT_DOCKER_NAME: &str = "arista/ceos";

/// Suffix of files still being written by the downloader
pub const PARTIAL_SUFFIX: &str = "part";

pub const EVE_QEMU_DIR: &str = "/opt/unetlab/addons/qemu";
pub const EVE_WRAPPER: &str = "/opt/unetlab/wrappers/unl_wrapper";
