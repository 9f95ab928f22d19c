use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use env_logger::Env;
use log::*;

use mlp_trainer::{
    data::{csv::load_directory, idx::load_mnist},
    ActivationFunction, Checkpoint, Dataset, Layer, MemoryDataset, Network, RandomSource, SplitKind,
    TrainConfig,
};

mod cli;

use cli::{Cli, DatasetKind, LayerConfig};

fn main() {
    let cli = Cli::parse();
    if std::env::var("RUST_LOG").is_err() {
        env_logger::Builder::new().parse_filters(cli.log_level.filter()).init();
    } else {
        env_logger::init_from_env(Env::default());
    }

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut rng = match cli.seed {
        Some(seed) => RandomSource::seeded(seed),
        None => RandomSource::from_entropy(),
    };

    let mut data = load_dataset(cli)?;
    let mut net = match &cli.resume {
        Some(path) => {
            let checkpoint = Checkpoint::load_json(path)
                .with_context(|| format!("can't resume from {:?}", path))?;
            Network::from_checkpoint(&mut data, checkpoint)?
        }
        None => {
            let layers = build_layers(cli, &data, &mut rng)?;
            Network::new(&mut data, layers)?
        }
    };

    let mut config = TrainConfig::new(cli.learning_rate, cli.epochs, cli.batch_size, cli.cost)
        .with_lambda(cli.lambda)
        .with_validation(cli.validate)
        .with_test(cli.test)
        .with_update_policy(cli.update_policy)
        .with_remainder(cli.remainder);
    if let Some(path) = &cli.history {
        config = config.with_history(path);
    }
    let started = Instant::now();
    net.train(&config, &mut rng).context("training failed")?;
    info!("Total time: {:.3} s", started.elapsed().as_secs_f64());

    let eval = net.evaluate(SplitKind::Test, cli.cost);
    info!(
        "Test accuracy {:.2}% ({} / {}), mean cost {:.6}",
        eval.accuracy * 100.0,
        eval.correct,
        eval.total,
        eval.mean_cost
    );

    if cli.show_misclassified > 0 {
        let names = (!cli.label_names.is_empty()).then_some(cli.label_names.as_slice());
        for shown in net.report_misclassified(SplitKind::Test, cli.show_misclassified, names, &mut rng) {
            println!("{}", shown);
        }
    }

    if let Some(path) = &cli.save {
        net.checkpoint()
            .save_json(path)
            .with_context(|| format!("can't save the network to {:?}", path))?;
    }
    Ok(())
}

fn load_dataset(cli: &Cli) -> anyhow::Result<MemoryDataset> {
    let data = match cli.dataset {
        DatasetKind::Csv => load_directory(&cli.data_dir, cli.training, cli.validation),
        DatasetKind::Mnist => load_mnist(&cli.data_dir, cli.training, cli.validation),
    };
    data.with_context(|| format!("can't load the dataset from {:?}", cli.data_dir))
}

/// Layers from `--layers`, or a 30-neuron sigmoid hidden layer followed by a
/// sigmoid output layer when none are given.
fn build_layers(cli: &Cli, data: &MemoryDataset, rng: &mut RandomSource) -> anyhow::Result<Vec<Layer>> {
    let configs = if cli.layers.is_empty() {
        vec![
            LayerConfig { size: 30, act_fn: ActivationFunction::Sigmoid },
            LayerConfig { size: data.n_outputs(), act_fn: ActivationFunction::Sigmoid },
        ]
    } else {
        cli.layers.clone()
    };

    if let Some(last) = configs.last() {
        if last.size != data.n_outputs() {
            bail!(
                "the last layer has {} neurons but the dataset has {} classes",
                last.size,
                data.n_outputs()
            );
        }
    }

    let mut n_inputs = data.n_inputs();
    let mut layers = Vec::with_capacity(configs.len());
    for config in configs {
        layers.push(Layer::with_initializer(n_inputs, config.size, config.act_fn, cli.init, rng));
        n_inputs = config.size;
    }
    Ok(layers)
}
