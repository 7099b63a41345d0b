pub(crate) mod generate;
pub(crate) mod serve;

pub(crate) use generate::generate;
pub(crate) use serve::serve;

use shieldgen_lib::{Dataset, Generator};

use crate::options::Config;

/// Parameters passed to every command
pub(crate) struct CommandParams {
    pub(crate) generator: Generator,
    /// Filter lists to select from, loaded once at startup
    pub(crate) dataset: Dataset,
    pub(crate) cfg: Config,
}
