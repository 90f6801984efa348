use thiserror::Error;

/// Errors raised while validating a breeding configuration.
///
/// These are caught once, when the strategies are bound, and never during a
/// generation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A probability-like parameter fell outside [0, 1].
    #[error("Invalid proportion for {0}: {1} (must be between 0.0 and 1.0)")]
    InvalidProportion(&'static str, f64),

    /// The mean fecundity was negative or not finite.
    #[error("Invalid mean fecundity: {0} (must be finite and >= 0.0)")]
    InvalidFecundity(f64),

    /// A logistic offspring model was selected without a usable growth rate.
    #[error("Invalid growth rate: {0} (must be finite and > 0.0 for logistic models)")]
    InvalidGrowthRate(f64),

    /// The sex ratio (males per female) could not be converted to a proportion.
    #[error("Invalid sex ratio: {0} males per female")]
    InvalidSexRatio(f64),

    /// Polygyny needs at least one designated male.
    #[error("Number of polygynous males must be at least 1")]
    NoMatingMales,

    /// The fittest-subset size must be at least 1.
    #[error("Fitness subset size must be at least 1")]
    EmptyFitnessSubset,

    /// Resetting sexes from phenotype only makes sense for two-sex systems.
    #[error("Sex threshold is set but mating system '{0}' has a single sex")]
    SexThresholdWithoutSexes(&'static str),

    /// The metapopulation is incompatible with the bound strategies.
    #[error("Incompatible metapopulation: {0}")]
    Incompatible(String),

    /// A configuration file could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(format!("JSON error: {e}"))
    }
}

/// Errors that can occur when constructing a fitness function.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitnessError {
    /// Invalid parameter value
    #[error("Invalid fitness parameter: {0}")]
    InvalidParameter(String),
}

/// Errors that abort a breeding cycle.
///
/// Infeasible mating is not represented here: a patch without the required
/// adults simply produces no offspring.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BreedingError {
    /// One-sex mating found adult males in a patch.
    #[error("Patch '{patch}': one-sex mating system found {males} adult males")]
    MalesInOneSexSystem { patch: String, males: usize },

    /// A sex split did not conserve the offspring total.
    #[error("Sex split mismatch: {sons} sons + {daughters} daughters != {total} offspring")]
    SexSplitMismatch {
        sons: usize,
        daughters: usize,
        total: usize,
    },

    /// An individual was placed in more than one monogamous pair.
    #[error("Monogamous pairing reused {sex} adult at index {index}")]
    PairReuse { sex: &'static str, index: usize },

    /// Any other broken invariant in strategy composition.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Errors that can occur while assembling a breeder with the builder.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// A required component is missing
    #[error("Missing required component: {0}")]
    MissingRequired(&'static str),

    /// The configuration failed validation
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The fitness function could not be built
    #[error(transparent)]
    Fitness(#[from] FitnessError),
}
