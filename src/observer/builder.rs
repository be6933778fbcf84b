use std::path::PathBuf;

use super::{Observer, ObserverOptions};

/// Builder for configuring an [`Observer`].
///
/// # Examples
///
/// ```
/// use biobj_logger::observer::{LogNondominated, Observer, ObserverOptions};
///
/// let observer = Observer::builder("exdata/random-search")
///     .algorithm_name("RS")
///     .algorithm_info("uniform random search")
///     .options(ObserverOptions {
///         log_nondominated: LogNondominated::Final,
///         ..ObserverOptions::default()
///     })
///     .build();
///
/// assert_eq!(observer.algorithm_name(), "RS");
/// assert_eq!(observer.options().log_nondominated, LogNondominated::Final);
/// ```
pub struct ObserverBuilder {
    output_folder: PathBuf,
    algorithm_name: String,
    algorithm_info: String,
    options: ObserverOptions,
}

impl ObserverBuilder {
    pub(super) fn new(output_folder: PathBuf) -> Self {
        Self {
            output_folder,
            algorithm_name: "ALG".to_string(),
            algorithm_info: String::new(),
            options: ObserverOptions::default(),
        }
    }

    /// Set the algorithm name written to the summary files.
    ///
    /// Defaults to `ALG`.
    #[must_use]
    pub fn algorithm_name(mut self, name: impl Into<String>) -> Self {
        self.algorithm_name = name.into();
        self
    }

    /// Set the free-form algorithm description written below the name.
    #[must_use]
    pub fn algorithm_info(mut self, info: impl Into<String>) -> Self {
        self.algorithm_info = info.into();
        self
    }

    /// Replace the logging options.
    #[must_use]
    pub fn options(mut self, options: ObserverOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the [`Observer`]. No file is touched until the first problem
    /// is observed.
    #[must_use]
    pub fn build(self) -> Observer {
        Observer {
            output_folder: self.output_folder,
            algorithm_name: self.algorithm_name,
            algorithm_info: self.algorithm_info,
            options: self.options,
            previous_group: None,
        }
    }
}
