/// Format tag written into every exported snapshot document
pub const SNAPSHOT_FORMAT_VERSION: &str = "1.0.0";

/// Key of the pre-versioned flat document left behind by older releases
pub const LEGACY_STORAGE_KEY: &str = "asset-manager-storage";

/// Upper bound for an asset's target allocation, in percent
pub const MAX_TARGET_RATIO: i32 = 100;

/// Institutions offered as suggestions when recording an allocation.
/// Labels are free-form; this list is not enforced.
pub const INSTITUTION_SUGGESTIONS: &[&str] = &[
    "东方财富",
    "支付宝",
    "京东金融",
    "天天基金",
    "微信零钱",
    "招商银行",
    "建设银行",
    "中国银行",
];
