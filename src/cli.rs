use std::{path::PathBuf, str::FromStr};

use clap::{Parser, ValueEnum};

use mlp_trainer::{
    ActivationFunction, CostFunction, Initializer, RemainderPolicy, UpdatePolicy,
};

#[derive(Parser, Debug)]
#[command(name = "mlp-trainer", version, about = "Train a fully connected network with mini-batch SGD")]
pub struct Cli {
    /// level of logging details (into stderr), ignored when RUST_LOG is set
    #[arg(short, long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// format of the dataset directory
    #[arg(long, value_enum, default_value_t = DatasetKind::Mnist)]
    pub dataset: DatasetKind,

    /// directory holding the dataset files
    #[arg(short, long, default_value = "data/mnist")]
    pub data_dir: PathBuf,

    /// number of training examples taken from the start of the training
    /// files, leave empty to use everything not reserved for validation
    #[arg(long)]
    pub training: Option<usize>,

    /// number of validation examples taken from the end of the training files
    #[arg(long, default_value_t = 0)]
    pub validation: usize,

    /// Layer configuration separated by commas in format [size]:[fn_type],
    /// including the output layer. Leave empty for one hidden layer of 30
    /// sigmoid neurons followed by a sigmoid output layer.
    ///
    /// Function type can be: sigmoid (sig, s), tanh (t), softplus (sp), relu (r)
    #[arg(long, value_parser = clap::value_parser!(LayerConfig), value_delimiter = ',')]
    pub layers: Vec<LayerConfig>,

    /// weight initialization scheme: normal, xavier or he
    #[arg(long, default_value_t = Initializer::StandardNormal, value_parser = clap::value_parser!(Initializer))]
    pub init: Initializer,

    /// learning rate
    #[arg(long, default_value_t = 0.5)]
    pub learning_rate: f64,

    /// number of training epochs
    #[arg(short, long, default_value_t = 30)]
    pub epochs: usize,

    /// mini-batch size
    #[arg(short, long, default_value_t = 10)]
    pub batch_size: usize,

    /// cost function: mse or cross-entropy
    #[arg(long, default_value_t = CostFunction::CrossEntropy, value_parser = clap::value_parser!(CostFunction))]
    pub cost: CostFunction,

    /// L2 regularization strength, 0 disables weight decay
    #[arg(long, default_value_t = 0.0)]
    pub lambda: f64,

    /// evaluate the validation split after every epoch
    #[arg(long, default_value_t = false)]
    pub validate: bool,

    /// evaluate the test split after every epoch
    #[arg(long, default_value_t = false)]
    pub test: bool,

    /// CSV file where per-epoch accuracy and cost are appended
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// seed for weight initialization and shuffling, leave empty for entropy
    #[arg(long)]
    pub seed: Option<u64>,

    /// when layer updates are applied: immediate or accumulate
    #[arg(long, default_value_t = UpdatePolicy::Immediate, value_parser = clap::value_parser!(UpdatePolicy))]
    pub update_policy: UpdatePolicy,

    /// what to do with a final undersized batch: include or drop
    #[arg(long, default_value_t = RemainderPolicy::Include, value_parser = clap::value_parser!(RemainderPolicy))]
    pub remainder: RemainderPolicy,

    /// number of misclassified test examples to print after training
    #[arg(long, default_value_t = 0)]
    pub show_misclassified: usize,

    /// names printed instead of class indices, separated by commas
    #[arg(long, value_delimiter = ',')]
    pub label_names: Vec<String>,

    /// file where the trained network is saved as JSON
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// checkpoint to continue training from; overrides --layers and --init
    #[arg(long)]
    pub resume: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum, Debug)]
pub enum DatasetKind {
    /// train_data.csv, train_labels.csv, test_data.csv, test_labels.csv
    Csv,
    /// IDX files as distributed with MNIST
    Mnist,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerConfig {
    pub size: usize,
    pub act_fn: ActivationFunction,
}

impl FromStr for LayerConfig {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut pieces = s.split(':');
        let size = match pieces.next() {
            None => return Err(String::from("Can't parse layer size from empty string")),
            Some(piece) => match piece.trim().parse::<usize>() {
                Ok(0) => return Err(String::from("Layer size must be at least 1")),
                Ok(n) => n,
                Err(_) => return Err(format!("Can't parse layer size from {:?}", piece)),
            },
        };
        let act_fn = match pieces.next() {
            None => return Err(String::from("Missing layer activation function type")),
            Some(piece) => piece.trim().parse::<ActivationFunction>()?,
        };
        if let Some(extra) = pieces.next() {
            return Err(format!("Unexpected trailing layer option {:?}", extra));
        }
        Ok(LayerConfig { size, act_fn })
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl LogLevel {
    /// `env_logger` filter enabling this level for the crate only.
    pub fn filter(self) -> &'static str {
        match self {
            LogLevel::Error => "off,mlp_trainer=error",
            LogLevel::Warn => "off,mlp_trainer=warn",
            LogLevel::Info => "off,mlp_trainer=info",
            LogLevel::Debug => "off,mlp_trainer=debug",
            LogLevel::Trace => "off,mlp_trainer=trace",
            LogLevel::Off => "off",
        }
    }
}
