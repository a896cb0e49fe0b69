//! `deploy`: rolling upgrade of a deployed service.

use crate::cli::{DeployArgs, RuntimeConfig};
use crate::deploy::{
    DeploymentOrchestrator, DeploymentTarget, RancherClient, RancherCredentials, UpgradeRequest,
    UpgradeState,
};
use crate::error::Result;
use tokio_util::sync::CancellationToken;

pub async fn deploy(args: &DeployArgs, runtime: &RuntimeConfig) -> Result<i32> {
    let request = UpgradeRequest {
        target: DeploymentTarget::parse(&args.service)?,
        image: args.image.clone(),
        options: args.options(),
    };

    let credentials = RancherCredentials::from_env()?;
    runtime.verbose_println(&format!("API endpoint: {}", credentials.url))?;
    let orchestrator = DeploymentOrchestrator::new(RancherClient::new(&credentials)?);

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    runtime.section(&format!("Deploying {} to {}", request.image, request.target))?;
    if request.options.confirm {
        runtime.progress(&format!(
            "Waiting up to {}s for the upgrade to be confirmed",
            request.options.timeout.as_secs()
        ))?;
    } else {
        runtime.warn("Confirmation skipped; the upgrade will not be finalized")?;
    }
    let result = orchestrator.deploy(&request, &cancel).await;
    interrupt.abort();
    let report = result?;

    match report.state {
        UpgradeState::Upgraded => runtime.success(&format!(
            "{} upgraded to {} and finalized",
            report.service, report.image
        ))?,
        state => runtime.success(&format!(
            "{} upgrade to {} {}",
            report.service, report.image, state
        ))?,
    }

    Ok(0)
}
