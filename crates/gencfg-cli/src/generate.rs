/*
 * generate.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Template expansion command
 */

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use gencfg::{ProcessingOptions, process};

/// Arguments for one expansion run
#[derive(Debug)]
pub struct GenerateArgs {
    pub template: PathBuf,
    /// Output file; stdout when `None`
    pub output: Option<PathBuf>,
    pub project_dir: Option<PathBuf>,
    pub literals: Vec<String>,
    pub arguments: Vec<(String, String)>,
}

/// Expand the template and write the result
pub fn execute(args: GenerateArgs) -> Result<()> {
    run(args, ProcessingOptions::new())
}

fn run(args: GenerateArgs, options: ProcessingOptions) -> Result<()> {
    let template_path = std::path::absolute(&args.template)
        .with_context(|| format!("normalizing template path {} failed", args.template.display()))?;
    debug!(template = %template_path.display(), "reading template");

    let template = fs::read(&template_path)
        .with_context(|| format!("unable to open template file {}", template_path.display()))?;
    if template.is_empty() {
        bail!("template file {} is empty", template_path.display());
    }

    let mut options = options.arguments(args.arguments);
    if let Some(dir) = args.project_dir {
        options = options.root_dir(dir);
    }
    for literal in args.literals {
        options = options.do_not_expand(literal);
    }

    let config = process(&template, &options).context("unable to generate configuration")?;

    match args.output {
        Some(path) => {
            fs::write(&path, &config)
                .with_context(|| format!("unable to write output file {}", path.display()))?;
            info!(output = %path.display(), "configuration written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&config)
                .and_then(|()| stdout.flush())
                .context("unable to write configuration to stdout")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gencfg::StaticHost;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn execute(args: GenerateArgs) -> Result<()> {
        run(args, ProcessingOptions::new().host(Arc::new(StaticHost::default())))
    }

    fn args(tmp: &TempDir, template: &str) -> GenerateArgs {
        let path = tmp.path().join("config.yaml.tmpl");
        fs::write(&path, template).unwrap();
        GenerateArgs {
            template: path,
            output: Some(tmp.path().join("config.yaml")),
            project_dir: Some(PathBuf::from("/srv/app")),
            literals: vec!["help".into()],
            arguments: vec![("env".into(), "prod".into())],
        }
    }

    #[test]
    fn test_writes_expanded_output() {
        let tmp = TempDir::new().unwrap();
        let args = args(
            &tmp,
            "dir: \"{{ ProjectDir }}/data\"\nenv: \"{{ Arguments.env }}\"\nhelp: \"{{ raw }}\"\nport: \"{{ 40 + 2 }}\"\n",
        );
        let output = args.output.clone().unwrap();
        execute(args).unwrap();
        assert_eq!(
            fs::read_to_string(output).unwrap(),
            "dir: \"/srv/app/data\"\nenv: \"prod\"\nhelp: \"{{ raw }}\"\nport: 42\n"
        );
    }

    #[test]
    fn test_empty_template_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = execute(args(&tmp, "")).unwrap_err();
        assert!(err.to_string().contains("is empty"));
    }

    #[test]
    fn test_missing_template() {
        let tmp = TempDir::new().unwrap();
        let mut args = args(&tmp, "a: 1\n");
        args.template = tmp.path().join("missing.tmpl");
        let err = execute(args).unwrap_err();
        assert!(err.to_string().starts_with("unable to open template file"));
    }

    #[test]
    fn test_expansion_error_has_context() {
        let tmp = TempDir::new().unwrap();
        let err = execute(args(&tmp, "x: \"{{ Undefined }}\"\n")).unwrap_err();
        assert_eq!(err.to_string(), "unable to generate configuration");
        let chain: Vec<String> = err.chain().map(ToString::to_string).collect();
        assert_eq!(chain[1], "failed to expand field 'x'");
    }
}
