use anyhow::Context;
use apibreak_profiles::{ProfileRegistry, load_profile_files};
use apibreak_types::ProfileDecl;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use fs_err as fs;
use serde_json::json;
use std::collections::BTreeMap;
use std::process::Command as ProcessCommand;

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Workspace helper tasks")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print schema identifiers used by apibreak.
    PrintSchemas,
    /// Write a starter profile directory and route table.
    InitProfiles {
        #[arg(long, default_value = "profiles")]
        dir: Utf8PathBuf,
    },
    /// Load a profile directory and print every diagnostic; fail on structural errors.
    CheckProfiles {
        #[arg(long, default_value = "profiles")]
        dir: Utf8PathBuf,
    },
    /// Run the property-based tests with more cases.
    Proptest {
        #[arg(long, default_value_t = 2048)]
        cases: u32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::PrintSchemas => {
            println!("{}", apibreak_types::schema::APIBREAK_ACTIVATION_V1);
        }
        Command::InitProfiles { dir } => init_profiles(&dir)?,
        Command::CheckProfiles { dir } => check_profiles(&dir)?,
        Command::Proptest { cases } => {
            let status = ProcessCommand::new("cargo")
                .args(["test", "-p", "apibreak-domain", "--test", "proptest_engine"])
                .env("PROPTEST_CASES", cases.to_string())
                .status()
                .context("run property tests")?;
            if !status.success() {
                anyhow::bail!("proptest run failed");
            }
        }
    }
    Ok(())
}

fn init_profiles(dir: &Utf8Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create {dir}"))?;

    let samples = [
        (
            "sales-stats.json",
            decl(
                "GET",
                "/categories/:id/sales-stats",
                &["STATUS_CODE", "RESPONSE_STRUCTURE"],
                [
                    ("STATUS_CODE", json!({ "successCode": 218 })),
                    ("RESPONSE_STRUCTURE", json!({ "wrapKey": "data" })),
                ],
            ),
        ),
        (
            "product-search.json",
            decl(
                "POST",
                "/products/search",
                &["FIELD_RENAME", "REQUIRED_FIELD", "TYPE_CHANGE"],
                [
                    (
                        "FIELD_RENAME",
                        json!({ "mapping": { "categoryId": "category_id", "minPrice": "min_price" } }),
                    ),
                    ("REQUIRED_FIELD", json!({ "field": "limit", "type": "number" })),
                ],
            ),
        ),
    ];

    let mut routes = String::from("# <METHOD> <path>, one per line\n");
    for (file, decl) in &samples {
        let path = dir.join(file);
        let text = serde_json::to_string_pretty(decl)?;
        fs::write(&path, text + "\n").with_context(|| format!("write {path}"))?;
        routes.push_str(&format!("{} {}\n", decl.method, decl.path));
    }
    let routes_path = dir.join("routes.txt");
    fs::write(&routes_path, routes).with_context(|| format!("write {routes_path}"))?;

    println!("initialized {dir} with {} profiles and routes.txt", samples.len());
    Ok(())
}

fn decl<const N: usize>(
    method: &str,
    path: &str,
    available: &[&str],
    definitions: [(&str, serde_json::Value); N],
) -> ProfileDecl {
    ProfileDecl {
        method: method.to_string(),
        path: path.to_string(),
        available_categories: available.iter().map(|c| c.to_string()).collect(),
        definitions: definitions
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<BTreeMap<_, _>>(),
    }
}

fn check_profiles(dir: &Utf8Path) -> anyhow::Result<()> {
    let files = load_profile_files(dir).with_context(|| format!("load profiles from {dir}"))?;
    let registry = ProfileRegistry::from_loaded(&files).context("build profile registry")?;

    let mut problems = 0usize;
    for path in registry.skipped() {
        println!("SKIPPED  {path}");
        problems += 1;
    }
    for profile in registry.iter() {
        for d in &profile.diagnostics {
            let cat = d.category.map(|c| c.as_str()).unwrap_or("-");
            println!("WARN     {} [{}] {}", profile.key, cat, d.message);
            problems += 1;
        }
    }
    println!("{} profiles, {} problems", registry.len(), problems);
    Ok(())
}
