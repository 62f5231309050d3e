use crate::api::config::{SecurityPolicy, SignatureVerdict};
use rgem_config::Config;
use rgem_events::EventSender;
use std::path::PathBuf;

/// Per-install options supplied by the front end
#[derive(Clone, Debug)]
pub struct InstallContext {
    /// Skip the dependency gate (not the security policy)
    pub force: bool,
    /// Install root; the configured home when `None`
    pub install_dir: Option<PathBuf>,
    pub ignore_dependencies: bool,
    /// Signature policy; nothing is checked when `None`
    pub security_policy: Option<SecurityPolicy>,
    /// Pre-computed verdict for the archive being installed
    pub signature: SignatureVerdict,
    /// Wrapper scripts instead of symlinks
    pub wrappers: bool,
    /// Use `#!/usr/bin/env <runtime>` in wrappers
    pub env_shebang: bool,
    /// Extra arguments for extension configure steps
    pub build_args: Vec<String>,
    /// Launcher directory; `<install_dir>/bin` when `None`
    pub bin_dir: Option<PathBuf>,

    /// Event sender for progress reporting
    pub event_sender: Option<EventSender>,
}

context_builder! {
    InstallContext {
        force: bool = false,
        install_dir: Option<PathBuf> = None,
        ignore_dependencies: bool = false,
        security_policy: Option<SecurityPolicy> = None,
        signature: SignatureVerdict = SignatureVerdict::Unsigned,
        wrappers: bool = true,
        env_shebang: bool = false,
        build_args: Vec<String> = Vec::new(),
        bin_dir: Option<PathBuf> = None,
    }
}

impl InstallContext {
    /// Start from the `[install]`, `[build]` and `[security]` sections
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let policy = config
            .security
            .only_signed
            .then(SecurityPolicy::only_signed);
        Self::new()
            .with_wrappers(config.install.wrappers)
            .with_env_shebang(config.install.env_shebang)
            .with_ignore_dependencies(config.install.ignore_dependencies)
            .with_build_args(config.build.build_args.clone())
            .with_security_policy(policy)
    }
}
