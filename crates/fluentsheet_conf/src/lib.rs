//! `fluentsheet_conf` v1:
//! Declarative column mapping between model members and sheet columns.
//!
//! Architecture:
//! - `conf`     : constants
//! - `spec`     : cell/sheet configuration models and errors
//! - `selector` : member selector expressions
//! - `util`     : pure helper functions
//! - `property` : per-member fluent builder
//! - `model`    : model-level builder and index resolution
pub mod conf;
pub mod model;
pub mod property;
pub mod selector;
pub mod spec;
pub mod util;

pub use conf::{C_FORMAT_PLACEHOLDER_PREFIX, C_FORMAT_PLACEHOLDER_SUFFIX, N_AUTO_INDEX_SEED};
pub use model::{ModelConfiguration, SheetModel};
pub use property::PropertyConfiguration;
pub use selector::{EnumMemberExpr, MemberSelector, derive_member_name};
pub use spec::{
    ConfError, EnumCellIndex, EnumCellValue, FnCellConvert, SpecCellConfig, SpecColumnLayout,
    SpecDisplayMeta, SpecFilterConfig, SpecFreezeConfig, SpecMemberDescriptor, SpecModelLayout,
    SpecStatisticsConfig,
};
pub use util::{
    derive_formatter_from_display_format, derive_header_title, select_title_position,
};
