//! Fixed names shared by the composition module and its host.

/// Install directory of every composed matrix, relative to the install root.
pub const INSTALL_DIR: &str = "etc/vintf";

/// Relative install path reported to legacy consumers.
pub const INSTALL_RELATIVE_PATH: &str = "vintf";

/// Module class reported to legacy consumers.
pub const EXPORT_CLASS: &str = "ETC";

/// Tool variable the default command template refers to.
pub const COMPOSER_TOOL: &str = "composer";

/// Name of the single rule every composition action uses.
pub const COMPOSE_RULE: &str = "compose_matrix";

/// Default command template for the composer invocation.
pub const DEFAULT_COMMAND_TEMPLATE: &str = "$${tool:composer} -i $${in} -o $${out}";

/// Separator between input paths in the `-i` argument.
pub const INPUT_SEPARATOR: &str = ":";

/// Prefix marking a source entry as a reference to another module.
pub const MODULE_REF_PREFIX: char = ':';

/// Environment variable overriding the composer tool location.
pub const COMPOSER_ENV: &str = "CMX_COMPOSER";

pub const OBJ_HASH_PREFIX_LEN: usize = 20;

/// Extension of the fingerprint stamp written next to every composed output.
pub const STAMP_EXTENSION: &str = "cmx-hash";
