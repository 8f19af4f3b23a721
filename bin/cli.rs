//! CLI tool for deploying and administering oracle reward vaults.

use oracle_reward_vault::factory::VaultFactory;
use oracle_reward_vault::tokens::WrappedNative;
use oracle_reward_vault::vault::OracleRewardVault;
use odra::casper_types::U256;
use odra::prelude::{Address, Addressable};
use odra::host::{HostEnv, NoArgs};
use odra::schema::casper_contract_schema::NamedCLType;
use odra_cli::{
    deploy::DeployScript,
    scenario::{Args, Error, Scenario, ScenarioMetadata},
    CommandArg, ContractProvider, DeployedContractsContainer, DeployerExt,
    OdraCli,
};

/// Default delay between a deposit and the depositor's next queued withdrawal (1 day)
const DEFAULT_COOLDOWN_MS: u64 = 86_400_000;

/// Deploys the wrapped CSPR token.
pub struct WrappedNativeDeployScript;

impl DeployScript for WrappedNativeDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        let _wnative = WrappedNative::load_or_deploy(
            &env,
            NoArgs,
            container,
            300_000_000_000
        )?;

        Ok(())
    }
}

/// Deploys the vault factory.
/// Requires the wrapped CSPR token to be deployed first.
pub struct VaultFactoryDeployScript;

impl DeployScript for VaultFactoryDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        use oracle_reward_vault::factory::VaultFactoryInitArgs;

        let caller = env.caller();
        let wnative = container.contract_ref::<WrappedNative>(env)?;
        let _factory = VaultFactory::load_or_deploy(
            &env,
            VaultFactoryInitArgs {
                default_operator: caller,
                wnative: wnative.address().clone(),
                deposit_to_withdraw_cooldown: DEFAULT_COOLDOWN_MS,
            },
            container,
            500_000_000_000
        )?;

        Ok(())
    }
}

/// Deploys wrapped CSPR and the factory.
pub struct ProtocolDeployScript;

impl DeployScript for ProtocolDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer
    ) -> Result<(), odra_cli::deploy::Error> {
        WrappedNativeDeployScript.deploy(env, container)?;
        VaultFactoryDeployScript.deploy(env, container)?;

        Ok(())
    }
}

fn vault_arg() -> CommandArg {
    CommandArg::new("vault", "Address of the vault", NamedCLType::Key)
}

/// Scenario to attach a strategy to a vault.
pub struct SetStrategyScenario;

impl Scenario for SetStrategyScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![
            vault_arg(),
            CommandArg::new(
                "strategy",
                "Address of the strategy to attach",
                NamedCLType::Key,
            ),
        ]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let mut factory = container.contract_ref::<VaultFactory>(env)?;
        let vault = args.get_single::<Address>("vault")?;
        let strategy = args.get_single::<Address>("strategy")?;

        env.set_gas(300_000_000_000);
        factory.try_set_strategy(vault, strategy)?;

        println!("Strategy attached");
        Ok(())
    }
}

impl ScenarioMetadata for SetStrategyScenario {
    const NAME: &'static str = "set-strategy";
    const DESCRIPTION: &'static str = "Attaches a strategy to a vault, migrating its funds";
}

/// Scenario to detach the strategy and enable emergency withdrawals.
pub struct EmergencyModeScenario;

impl Scenario for EmergencyModeScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![vault_arg()]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let mut factory = container.contract_ref::<VaultFactory>(env)?;
        let vault = args.get_single::<Address>("vault")?;

        env.set_gas(300_000_000_000);
        factory.try_set_emergency_mode(vault)?;

        println!("Vault is in emergency mode");
        Ok(())
    }
}

impl ScenarioMetadata for EmergencyModeScenario {
    const NAME: &'static str = "set-emergency-mode";
    const DESCRIPTION: &'static str = "Pulls all funds back into the vault and detaches its strategy";
}

/// Scenario to pause or resume deposits.
pub struct PauseDepositsScenario;

impl Scenario for PauseDepositsScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![
            vault_arg(),
            CommandArg::new(
                "paused",
                "true to pause deposits, false to resume",
                NamedCLType::Bool,
            ),
        ]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let mut factory = container.contract_ref::<VaultFactory>(env)?;
        let vault = args.get_single::<Address>("vault")?;
        let paused = args.get_single::<bool>("paused")?;

        env.set_gas(50_000_000_000);
        if paused {
            factory.try_pause_deposits(vault)?;
            println!("Deposits paused");
        } else {
            factory.try_resume_deposits(vault)?;
            println!("Deposits resumed");
        }
        Ok(())
    }
}

impl ScenarioMetadata for PauseDepositsScenario {
    const NAME: &'static str = "pause-deposits";
    const DESCRIPTION: &'static str = "Pauses or resumes deposits into a vault";
}

/// Scenario to start tracking a reward token on a vault.
pub struct NotifyRewardTokenScenario;

impl Scenario for NotifyRewardTokenScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![
            vault_arg(),
            CommandArg::new(
                "token",
                "Address of the reward token",
                NamedCLType::Key,
            ),
        ]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let mut factory = container.contract_ref::<VaultFactory>(env)?;
        let vault = args.get_single::<Address>("vault")?;
        let token = args.get_single::<Address>("token")?;

        env.set_gas(100_000_000_000);
        factory.try_notify_reward_token(vault, token)?;

        println!("Reward token registered");
        Ok(())
    }
}

impl ScenarioMetadata for NotifyRewardTokenScenario {
    const NAME: &'static str = "notify-reward-token";
    const DESCRIPTION: &'static str = "Registers a reward token on a vault";
}

/// Scenario to recover stray tokens from a vault.
pub struct RecoverScenario;

impl Scenario for RecoverScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![
            vault_arg(),
            CommandArg::new("token", "Address of the token to recover", NamedCLType::Key),
            CommandArg::new("recipient", "Address receiving the tokens", NamedCLType::Key),
            CommandArg::new("amount", "Amount to recover", NamedCLType::U256),
        ]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args
    ) -> Result<(), Error> {
        let mut factory = container.contract_ref::<VaultFactory>(env)?;
        let vault = args.get_single::<Address>("vault")?;
        let token = args.get_single::<Address>("token")?;
        let recipient = args.get_single::<Address>("recipient")?;
        let amount = args.get_single::<U256>("amount")?;

        env.set_gas(100_000_000_000);
        factory.try_recover_erc20(vault, token, recipient, amount)?;

        println!("Recovered {} tokens", amount);
        Ok(())
    }
}

impl ScenarioMetadata for RecoverScenario {
    const NAME: &'static str = "recover";
    const DESCRIPTION: &'static str = "Recovers unreserved tokens from a vault";
}

/// Main function to run the CLI tool.
pub fn main() {
    OdraCli::new()
        .about("CLI tool for oracle reward vault contracts")
        // Deploy scripts
        .deploy(WrappedNativeDeployScript)
        .deploy(VaultFactoryDeployScript)
        .deploy(ProtocolDeployScript)
        // Contract references
        .contract::<WrappedNative>()
        .contract::<VaultFactory>()
        .contract::<OracleRewardVault>()
        // Scenarios
        .scenario(SetStrategyScenario)
        .scenario(EmergencyModeScenario)
        .scenario(PauseDepositsScenario)
        .scenario(NotifyRewardTokenScenario)
        .scenario(RecoverScenario)
        .build()
        .run();
}
