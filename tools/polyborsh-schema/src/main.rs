// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

mod hex;
mod json;

use anyhow::Context;
use clap::{Parser, Subcommand};
use polyborsh::schema::SchemaLoader;
use polyborsh::{DeserializeOptions, Materialize, Registry, TypeId, ValidateOptions};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "polyborsh-schema")]
#[command(about = "Validate YAML type schemas and encode/decode values against them")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that every family in the schema decodes unambiguously
    Validate {
        /// Input schema YAML file
        #[arg(value_name = "FILE")]
        schema: PathBuf,

        /// Only validate the families reachable from these types
        #[arg(short, long = "root", value_name = "TYPE")]
        roots: Vec<String>,

        /// Accept struct fields whose type declares nothing
        #[arg(long)]
        allow_unknown_field_types: bool,
    },

    /// Print the type tree with tags and fields
    Show {
        #[arg(value_name = "FILE")]
        schema: PathBuf,
    },

    /// Encode a JSON value to hex
    Encode {
        #[arg(value_name = "FILE")]
        schema: PathBuf,

        /// Declared type (full path)
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        ty: String,

        /// JSON value, or `-` to read stdin
        #[arg(value_name = "JSON")]
        value: String,
    },

    /// Decode hex bytes to JSON
    Decode {
        #[arg(value_name = "FILE")]
        schema: PathBuf,

        /// Target type (full path); any descendant may come back
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        ty: String,

        /// Hex-encoded bytes
        #[arg(value_name = "HEX")]
        hex: String,

        /// Ignore trailing bytes
        #[arg(long)]
        unchecked: bool,

        /// Emit plain field maps without `$type`
        #[arg(long)]
        plain: bool,
    },

    /// Print the discriminator prefix of a type as hex
    Discriminator {
        #[arg(value_name = "FILE")]
        schema: PathBuf,

        #[arg(short = 't', long = "type", value_name = "TYPE")]
        ty: String,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            schema,
            roots,
            allow_unknown_field_types,
        } => cmd_validate(&schema, &roots, allow_unknown_field_types),
        Commands::Show { schema } => cmd_show(&schema),
        Commands::Encode { schema, ty, value } => cmd_encode(&schema, &ty, &value),
        Commands::Decode {
            schema,
            ty,
            hex,
            unchecked,
            plain,
        } => cmd_decode(&schema, &ty, &hex, unchecked, plain),
        Commands::Discriminator { schema, ty } => cmd_discriminator(&schema, &ty),
    }
}

fn load(schema: &Path) -> anyhow::Result<Registry> {
    let registry = SchemaLoader::build_registry(schema)
        .with_context(|| format!("loading {}", schema.display()))?;
    log::debug!("loaded {} types from {}", registry.len(), schema.display());
    Ok(registry)
}

fn resolve(registry: &Registry, ty: &str) -> anyhow::Result<TypeId> {
    Ok(registry.resolve(ty)?)
}

fn cmd_validate(schema: &Path, roots: &[String], allow_unknown: bool) -> anyhow::Result<()> {
    let registry = load(schema)?;
    let options = ValidateOptions::default().allow_unknown_field_types(allow_unknown);

    if roots.is_empty() {
        registry.validate_all(&options)?;
    } else {
        let ids = roots
            .iter()
            .map(|r| resolve(&registry, r))
            .collect::<anyhow::Result<Vec<_>>>()?;
        registry.validate(&ids, &options)?;
    }

    println!(
        "[OK] schema validation passed: {} ({} types)",
        schema.display(),
        registry.len()
    );
    Ok(())
}

fn cmd_show(schema: &Path) -> anyhow::Result<()> {
    let registry = load(schema)?;
    for entry in registry.iter().filter(|e| e.parent().is_none()) {
        print_tree(&registry, entry.id(), 0);
    }
    Ok(())
}

fn print_tree(registry: &Registry, ty: TypeId, depth: usize) {
    let Some(entry) = registry.lookup(ty) else {
        return;
    };
    let indent = "  ".repeat(depth);
    match entry.variant() {
        Some(tag) => println!("{indent}{} (variant {})", entry.name(), tag),
        None => println!("{indent}{}", entry.name()),
    }
    for field in entry.fields() {
        println!("{indent}  .{}: {}", field.key, registry.describe(&field.ty));
    }
    for child in entry.children() {
        print_tree(registry, *child, depth + 1);
    }
}

fn cmd_encode(schema: &Path, ty: &str, value: &str) -> anyhow::Result<()> {
    let registry = load(schema)?;
    let declared = resolve(&registry, ty)?;

    let text = if value == "-" {
        std::io::read_to_string(std::io::stdin())?
    } else {
        value.to_string()
    };
    let input: serde_json::Value = serde_json::from_str(&text).context("parsing JSON input")?;

    let record = json::record_from_json(&registry, declared, &input)?;
    let bytes = registry.serialize(&record)?;
    println!("{}", hex::encode(&bytes));
    Ok(())
}

fn cmd_decode(schema: &Path, ty: &str, input: &str, unchecked: bool, plain: bool) -> anyhow::Result<()> {
    let registry = load(schema)?;
    let target = resolve(&registry, ty)?;
    let bytes = hex::decode(input)?;

    let options = DeserializeOptions::new()
        .unchecked(unchecked)
        .materialize(if plain {
            Materialize::PlainMap
        } else {
            Materialize::Record
        });
    let value = registry.deserialize_with(&bytes, target, &options)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&json::value_to_json(&registry, &value))?
    );
    Ok(())
}

fn cmd_discriminator(schema: &Path, ty: &str) -> anyhow::Result<()> {
    let registry = load(schema)?;
    let id = resolve(&registry, ty)?;
    println!("{}", hex::encode(&registry.discriminator_of(id)?));
    Ok(())
}
