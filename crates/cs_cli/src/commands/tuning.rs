//! `cs tuning`: partitioning and parallel IO settings.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use cs_core::case::Case;
use cs_core::models::{BlockIoMethod, PartitionOutput, PartitionType, PerformanceTuningModel};

#[derive(Args, Debug)]
pub struct TuningArgs {
    /// Case file to edit
    pub setup: PathBuf,

    /// Partitioning algorithm (quote values with spaces, e.g. "morton sfc")
    #[arg(long, value_name = "TYPE")]
    pub partition_type: Option<PartitionType>,

    /// Write the partitioning: no, default or yes
    #[arg(long, value_name = "OUTPUT")]
    pub partition_output: Option<PartitionOutput>,

    /// Block IO read method
    #[arg(long, value_name = "METHOD")]
    pub read_method: Option<BlockIoMethod>,

    /// Block IO write method
    #[arg(long, value_name = "METHOD")]
    pub write_method: Option<BlockIoMethod>,

    /// Minimal block size in bytes
    #[arg(long, value_name = "BYTES")]
    pub min_block_size: Option<u64>,
}

pub fn run(args: TuningArgs) -> anyhow::Result<()> {
    let mut case =
        Case::load(&args.setup).with_context(|| format!("Cannot open {}", args.setup.display()))?;

    {
        let mut tuning = PerformanceTuningModel::new(&mut case);
        if let Some(value) = args.partition_type {
            tuning.set_partition_type(value);
        }
        if let Some(value) = args.partition_output {
            tuning.set_partition_output(value);
        }
        if let Some(method) = args.read_method {
            tuning.set_block_io_read_method(method);
        }
        if let Some(method) = args.write_method {
            tuning.set_block_io_write_method(method);
        }
        if let Some(size) = args.min_block_size {
            tuning.set_block_io_min_size(size);
        }

        println!("partition type:   {}", tuning.partition_type());
        println!("partition output: {}", tuning.partition_output());
        println!("read method:      {}", tuning.block_io_read_method());
        println!("write method:     {}", tuning.block_io_write_method());
        println!("min block size:   {}", tuning.block_io_min_size());
    }

    if case.is_modified() {
        case.save()?;
    }
    Ok(())
}
