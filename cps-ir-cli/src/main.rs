use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cps_ir::combinators;
use cps_ir::module::{ExternalToolchain, SealTarget};
use cps_ir::types::{PrimTag, Type};
use cps_ir::ModuleContext;

#[derive(Parser)]
#[command(name = "cps-ir")]
#[command(version = "0.2.0")]
#[command(about = "Driver for the CPS IR builder library", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a demo `add(i32, i32) -> i32` module and seal it.
    Build {
        /// Module name (also the output file stem).
        #[arg(value_name = "NAME")]
        name: String,

        /// Output directory for the sealed document (and, with
        /// `--emit-llvm`, the compiled artifacts).
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Also invoke the external toolchain and emit a linked shared
        /// object, instead of writing the document only.
        #[arg(long)]
        emit_llvm: bool,

        /// Keep the intermediate `.thorin.json`/`.ll`/`.so` files
        /// instead of deleting them after a successful module-target
        /// seal.
        #[arg(long)]
        keep_build_files: bool,
    },

    /// Import an already-serialized module document and report what it
    /// contains.
    Import {
        /// Path to a `.thorin.json`-style document.
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Build {
            name,
            output,
            emit_llvm,
            keep_build_files,
        } => build(name, output, emit_llvm, keep_build_files),
        Commands::Import { document } => import(document),
    }
}

fn build(name: String, output: Option<PathBuf>, emit_llvm: bool, keep_build_files: bool) -> Result<()> {
    if keep_build_files {
        std::env::set_var("KEEP_BUILD_FILES", "1");
    }

    let seal_target = if emit_llvm {
        SealTarget::Module {
            toolchain: Box::new(ExternalToolchain),
        }
    } else {
        SealTarget::DocumentOnly
    };

    let dir = output.unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir)?;
    let previous = std::env::current_dir()?;
    std::env::set_current_dir(&dir)?;

    let mut module = ModuleContext::open_with_target(name, seal_target);
    let i32_type = Type::scalar(PrimTag::Qs32);
    combinators::define_function(
        &mut module,
        "add",
        vec![i32_type.clone(), i32_type],
        Type::scalar(PrimTag::Qs32),
        |_mem, params| params[0].add(params[1].clone()),
    );
    let document = module.seal()?;
    std::env::set_current_dir(previous)?;

    log::info!(
        "sealed `{}`: {} types, {} defs",
        document.module,
        document.type_table.len(),
        document.defs.len()
    );
    Ok(())
}

fn import(document: PathBuf) -> Result<()> {
    let mut module = ModuleContext::open("importer");
    module.include_document(&document)?;
    log::info!("imported document {:?}", document);
    Ok(())
}
