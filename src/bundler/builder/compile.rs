//! Single-target compilation.

use super::shrink::try_shrink;
use crate::bundler::{
    Error, Result,
    error::ErrorExt,
    path::resolve_output_path,
    settings::{PackageSpec, PipelineConfig, TargetPlatform},
};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Compiles a package for one target at a time.
///
/// # Examples
///
/// ```no_run
/// use release_pipeline::bundler::{Builder, PackageSpecBuilder, PipelineConfig, LINUX_AMD64};
///
/// # async fn example() -> release_pipeline::bundler::Result<()> {
/// let builder = Builder::new(PipelineConfig::default());
/// let spec = PackageSpecBuilder::new("agent", semver::Version::new(1, 2, 3)).build()?;
/// let path = builder.build(&spec, &LINUX_AMD64).await?;
/// println!("built {}", path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Builder {
    config: PipelineConfig,
}

impl Builder {
    /// Creates a builder using the given configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Environment overrides for compiling `spec` for `target`.
    ///
    /// The native-interop variable is always present. OS and architecture
    /// overrides appear only when the target sets them; an empty field
    /// inherits the host default.
    pub fn environment(&self, spec: &PackageSpec, target: &TargetPlatform) -> Vec<(String, String)> {
        let toolchain = &self.config.toolchain;
        let mut env = vec![(
            toolchain.native_interop_var.clone(),
            if spec.native_interop() { "1" } else { "0" }.to_string(),
        )];

        if !target.os().is_empty() {
            env.push((toolchain.os_var.clone(), target.os().to_string()));
        }
        if !target.arch().is_empty() {
            env.push((toolchain.arch_var.clone(), target.arch().to_string()));
        }

        env
    }

    /// Compiler arguments for writing to `output`.
    pub fn arguments(&self, spec: &PackageSpec, output: &Path) -> Vec<String> {
        let toolchain = &self.config.toolchain;
        let mut args = toolchain.subcommand.clone();
        args.push(toolchain.output_flag.clone());
        args.push(output.display().to_string());
        args.extend(spec.build_args().iter().cloned());
        args.push(spec.source().display().to_string());
        args
    }

    /// Builds `spec` for `target` and returns the artifact path.
    ///
    /// When the spec requests size reduction it runs after a successful
    /// build, and after a failed one if a partial artifact was left behind.
    /// It never changes the outcome.
    ///
    /// # Errors
    ///
    /// - [`Error::PathTemplate`] if the output template cannot be rendered
    /// - [`Error::CompilerSpawn`] if the compiler cannot be started
    /// - [`Error::CompileFailed`] with exit status and combined output
    pub async fn build(&self, spec: &PackageSpec, target: &TargetPlatform) -> Result<PathBuf> {
        let output_path = resolve_output_path(spec, target, &self.config)?;

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .fs_context("creating output directory", parent)?;
        }

        let program = &self.config.toolchain.program;
        let args = self.arguments(spec, &output_path);
        let env = self.environment(spec, target);

        log::info!(
            "Building {} for {} to {} ...",
            spec.name(),
            target,
            output_path.display()
        );
        log::debug!("{} {} (env: {:?})", program, args.join(" "), env);

        let output = Command::new(program)
            .args(&args)
            .envs(env)
            .output()
            .await
            .map_err(|source| Error::CompilerSpawn {
                program: program.clone(),
                target: target.clone(),
                path: output_path.clone(),
                source,
            })?;

        if !output.status.success() {
            if spec.shrink() && output_path.is_file() {
                log::warn!(
                    "Build of {} failed; shrinking partial artifact {}",
                    target,
                    output_path.display()
                );
                try_shrink(&self.config.toolchain, target, &output_path).await;
            }

            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));

            return Err(Error::CompileFailed {
                target: target.clone(),
                path: output_path,
                status: output.status.to_string(),
                output: combined.trim_end().to_string(),
            });
        }

        if spec.shrink() {
            try_shrink(&self.config.toolchain, target, &output_path).await;
        }

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::{HOST, LINUX_AMD64, PackageSpecBuilder, Toolchain, WINDOWS_386};

    fn spec() -> PackageSpec {
        PackageSpecBuilder::new("agent", semver::Version::new(1, 2, 3))
            .source("./cmd/agent")
            .build_args(vec!["-trimpath".into()])
            .build()
            .unwrap()
    }

    #[test]
    fn host_build_sets_only_native_interop() {
        let builder = Builder::new(PipelineConfig::default());
        let env = builder.environment(&spec(), &HOST);
        assert_eq!(env, vec![("CGO_ENABLED".to_string(), "0".to_string())]);
    }

    #[test]
    fn cross_build_sets_os_and_arch() {
        let builder = Builder::new(PipelineConfig::default());
        let env = builder.environment(&spec(), &WINDOWS_386);
        assert!(env.contains(&("GOOS".to_string(), "windows".to_string())));
        assert!(env.contains(&("GOARCH".to_string(), "386".to_string())));
    }

    #[test]
    fn native_interop_opt_in_flips_flag() {
        let builder = Builder::new(PipelineConfig::default());
        let spec = PackageSpecBuilder::new("agent", semver::Version::new(1, 0, 0))
            .native_interop(true)
            .build()
            .unwrap();
        let env = builder.environment(&spec, &LINUX_AMD64);
        assert_eq!(env[0], ("CGO_ENABLED".to_string(), "1".to_string()));
    }

    #[test]
    fn arguments_place_extra_args_before_source() {
        let builder = Builder::new(PipelineConfig::default());
        let args = builder.arguments(&spec(), Path::new("./bin/agent"));
        assert_eq!(args, vec!["build", "-o", "./bin/agent", "-trimpath", "./cmd/agent"]);
    }

    #[cfg(unix)]
    mod with_fake_compiler {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Writes a compiler that records its OS/arch env into the output file,
        /// or fails when the target OS is `plan9`.
        fn fake_compiler(dir: &Path) -> PathBuf {
            let script = dir.join("fake-go");
            std::fs::write(
                &script,
                "#!/bin/sh\n\
                 if [ \"$GOOS\" = \"plan9\" ]; then echo 'unsupported GOOS' >&2; exit 3; fi\n\
                 echo \"$GOOS/$GOARCH/$CGO_ENABLED\" > \"$3\"\n",
            )
            .unwrap();
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
            script
        }

        fn builder_in(dir: &Path) -> Builder {
            Builder::new(PipelineConfig {
                default_out_dir: dir.join("bin"),
                toolchain: Toolchain {
                    program: fake_compiler(dir).display().to_string(),
                    strip_program: "release-pipeline-missing-strip".into(),
                    compress_program: "release-pipeline-missing-upx".into(),
                    ..Toolchain::default()
                },
                ..PipelineConfig::default()
            })
        }

        #[tokio::test]
        async fn successful_build_writes_resolved_path() {
            let dir = tempfile::tempdir().unwrap();
            let builder = builder_in(dir.path());
            let spec = PackageSpecBuilder::new("agent", semver::Version::new(1, 2, 3))
                .shrink(true)
                .build()
                .unwrap();

            let path = builder.build(&spec, &LINUX_AMD64).await.unwrap();
            assert_eq!(path, dir.path().join("bin/agent_1.2.3_linux_amd64"));
            let content = std::fs::read_to_string(&path).unwrap();
            assert_eq!(content.trim(), "linux/amd64/0");
        }

        #[tokio::test]
        async fn failed_build_reports_status_output_and_path() {
            let dir = tempfile::tempdir().unwrap();
            let builder = builder_in(dir.path());
            let spec = PackageSpecBuilder::new("agent", semver::Version::new(1, 2, 3))
                .shrink(true)
                .build()
                .unwrap();
            let target = TargetPlatform::new("plan9", "amd64");

            match builder.build(&spec, &target).await.unwrap_err() {
                Error::CompileFailed { target: t, path, output, .. } => {
                    assert_eq!(t, target);
                    assert_eq!(path, dir.path().join("bin/agent_1.2.3_plan9_amd64"));
                    assert!(output.contains("unsupported GOOS"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn missing_compiler_is_a_spawn_error() {
            let dir = tempfile::tempdir().unwrap();
            let builder = Builder::new(PipelineConfig {
                default_out_dir: dir.path().join("bin"),
                toolchain: Toolchain {
                    program: dir.path().join("no-such-compiler").display().to_string(),
                    ..Toolchain::default()
                },
                ..PipelineConfig::default()
            });
            let err = builder.build(&spec(), &LINUX_AMD64).await.unwrap_err();
            assert_eq!(err.target(), Some(&LINUX_AMD64));
            let expected = dir.path().join("bin/agent_1.2.3_linux_amd64");
            assert!(err.to_string().contains(&expected.display().to_string()));
            match err {
                Error::CompilerSpawn { path, .. } => assert_eq!(path, expected),
                other => panic!("unexpected error: {other}"),
            }
        }
    }
}
