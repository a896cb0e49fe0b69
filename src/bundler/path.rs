//! Output path resolution for a package and a single target.
//!
//! Two schemes exist:
//!
//! 1. A user-supplied Handlebars template, rendered in strict mode with the
//!    package fields and the target's OS / architecture.
//! 2. The default scheme: `{out_dir}/{name}_{version}_{os}_{arch}[.exe]`, or
//!    `{out_dir}/{name}[.exe]` for the host build.
//!
//! Resolution is a pure function of the spec, the target and the configured
//! default output directory.

use crate::bundler::{
    Error, Result,
    settings::{PackageSpec, PipelineConfig, TargetPlatform},
};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::PathBuf;

/// Variables available to naming templates.
#[derive(Debug, Serialize)]
struct TemplateContext<'a> {
    name: &'a str,
    version: String,
    out_dir: String,
    source: String,
    os: &'a str,
    arch: &'a str,
    platform: String,
}

/// Resolves the artifact path for `spec` built for `target`.
///
/// # Errors
///
/// Returns [`Error::PathTemplate`] carrying the template text if the
/// template fails to parse, references an unknown variable, or renders to
/// an empty string.
///
/// # Examples
///
/// ```no_run
/// use release_pipeline::bundler::{PackageSpecBuilder, PipelineConfig, WINDOWS_AMD64, resolve_output_path};
///
/// let spec = PackageSpecBuilder::new("agent", semver::Version::new(1, 2, 3)).build().unwrap();
/// let path = resolve_output_path(&spec, &WINDOWS_AMD64, &PipelineConfig::default()).unwrap();
/// assert_eq!(path.to_str(), Some("./bin/agent_1.2.3_windows_amd64.exe"));
/// ```
pub fn resolve_output_path(
    spec: &PackageSpec,
    target: &TargetPlatform,
    config: &PipelineConfig,
) -> Result<PathBuf> {
    let out_dir = spec.out_dir().unwrap_or(&config.default_out_dir);

    if let Some(template) = spec.out_template() {
        let context = TemplateContext {
            name: spec.name(),
            version: spec.version_string(),
            out_dir: out_dir.display().to_string(),
            source: spec.source().display().to_string(),
            os: target.os(),
            arch: target.arch(),
            platform: target.to_string(),
        };
        return render_template(template, &context).map(PathBuf::from);
    }

    let mut file_name = if target.is_host() {
        spec.name().to_string()
    } else {
        format!(
            "{}_{}_{}_{}",
            spec.name(),
            spec.version_string(),
            target.os(),
            target.arch()
        )
    };
    file_name.push_str(target.executable_suffix());

    Ok(out_dir.join(file_name))
}

fn render_template(template: &str, context: &TemplateContext<'_>) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars.register_escape_fn(handlebars::no_escape);

    let rendered = handlebars
        .render_template(template, context)
        .map_err(|e| Error::PathTemplate {
            template: template.to_string(),
            reason: e.to_string(),
        })?;

    if rendered.trim().is_empty() {
        return Err(Error::PathTemplate {
            template: template.to_string(),
            reason: "template rendered an empty path".to_string(),
        });
    }

    Ok(rendered)
}

/// Packaging layout: `build/outputs/{os}/{arch}/{name}/{version}/{name}[.exe]`.
///
/// Plugin distributions nest outputs so every target gets its own directory
/// for the manifest and archive.
pub fn plugin_layout_template(name: &str) -> String {
    format!(
        "build/outputs/{{{{os}}}}/{{{{arch}}}}/{name}/{{{{version}}}}/{name}{{{{#if (eq os \"windows\")}}}}.exe{{{{/if}}}}"
    )
}
