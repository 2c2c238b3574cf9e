// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with clap.
// Every command is routed to a Layer 2 use case; this layer
// only formats what comes back.
//
//   1. `forward`     — random-grid forward pass
//   2. `describe`    — architecture + parameter count
//   3. `init-config` — write a starter run configuration

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, DescribeArgs, ForwardArgs, InitConfigArgs};

#[derive(Parser, Debug)]
#[command(
    name = "grid-transformer",
    version,
    about = "Transformer over token grids: embedding, attention stack, linear output head."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Forward(args)    => Self::run_forward(args),
            Commands::Describe(args)   => Self::run_describe(args),
            Commands::InitConfig(args) => Self::run_init_config(args),
        }
    }

    fn run_forward(args: ForwardArgs) -> Result<()> {
        use crate::application::forward_use_case::ForwardUseCase;

        let cfg    = args.resolve()?;
        let report = ForwardUseCase::new(cfg).execute()?;

        println!("device      : {}", report.device);
        println!("encoder     : {}", report.encoder);
        println!("parameters  : {}", report.num_params);
        println!("input shape : {:?}", report.input_shape);
        println!(
            "output      : {:?} (reshape each row to {:?})",
            report.output_dims, report.output_size,
        );
        let preview: Vec<String> = report.preview.iter().map(|v| format!("{v:.4}")).collect();
        println!("row 0       : [{}, ...]", preview.join(", "));
        Ok(())
    }

    fn run_describe(args: DescribeArgs) -> Result<()> {
        use crate::application::describe_use_case::DescribeUseCase;

        let cfg     = args.config.resolve()?;
        let summary = DescribeUseCase::new(cfg).execute()?;
        let [flat, middle, emb, out] = summary.head_widths;

        println!("GridTransformer ({} encoder)", summary.encoder);
        println!("  embedding     : {} tokens × {}", summary.num_tokens, summary.embeddings);
        println!(
            "  attention     : {} heads × {} dims{}",
            summary.heads,
            summary.head_dim,
            if summary.masked { ", causal" } else { "" },
        );
        println!("  layers        : {} (ff {})", summary.depth, summary.ff_dimension);
        println!("  seq_length    : {}", summary.seq_length);
        println!("  output head   : {flat} → {middle} → {emb} → {out}");
        println!("  output size   : {:?}", summary.output_size);
        println!("  parameters    : {}", summary.num_params);
        Ok(())
    }

    fn run_init_config(args: InitConfigArgs) -> Result<()> {
        args.write()?;
        tracing::info!("Wrote default run configuration");
        println!("Wrote {}", args.out.display());
        Ok(())
    }
}
