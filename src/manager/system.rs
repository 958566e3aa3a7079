//! Concrete package manager handles driving the system tools.
use std::sync::Arc;

use anyhow::Result;

use super::PackageManager;
use crate::exec::Executor;

/// Debian/Ubuntu apt handle.
pub struct Apt {
    executor: Arc<dyn Executor>,
}

impl Apt {
    /// Create an apt handle using the given executor.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    /// Known PPAs for packages absent from the default Ubuntu repositories.
    fn ppa_for(package: &str) -> Option<&'static str> {
        match package {
            "neovim" => Some("ppa:neovim-ppa/stable"),
            "git" => Some("ppa:git-core/ppa"),
            "fastfetch" => Some("ppa:zhangsongcui3371/fastfetch"),
            _ => None,
        }
    }
}

impl PackageManager for Apt {
    fn name(&self) -> &str {
        "apt"
    }

    fn install(&self, package: &str) -> Result<()> {
        self.executor
            .run("sudo", &["apt-get", "install", "-y", package])?;
        Ok(())
    }

    fn uninstall(&self, package: &str) -> Result<()> {
        self.executor
            .run("sudo", &["apt-get", "remove", "-y", package])?;
        Ok(())
    }

    fn update(&self) -> Result<()> {
        self.executor.run("sudo", &["apt-get", "update"])?;
        Ok(())
    }

    fn is_installed(&self, package: &str) -> bool {
        self.executor
            .run_unchecked("dpkg", &["-s", package])
            .is_ok_and(|r| r.success)
    }

    fn setup_special_package(&self, package: &str) -> Result<bool> {
        let Some(ppa) = Self::ppa_for(package) else {
            return Ok(false);
        };
        self.executor
            .run("sudo", &["add-apt-repository", "-y", ppa])?;
        Ok(true)
    }
}

/// Fedora/RHEL dnf handle.
pub struct Dnf {
    executor: Arc<dyn Executor>,
}

impl Dnf {
    /// Create a dnf handle using the given executor.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    /// Known coprs for packages absent from the default Fedora repositories.
    fn copr_for(package: &str) -> Option<&'static str> {
        match package {
            "lazygit" => Some("atim/lazygit"),
            "starship" => Some("atim/starship"),
            _ => None,
        }
    }
}

impl PackageManager for Dnf {
    fn name(&self) -> &str {
        "dnf"
    }

    fn install(&self, package: &str) -> Result<()> {
        self.executor
            .run("sudo", &["dnf", "install", "-y", package])?;
        Ok(())
    }

    fn uninstall(&self, package: &str) -> Result<()> {
        self.executor
            .run("sudo", &["dnf", "remove", "-y", package])?;
        Ok(())
    }

    fn update(&self) -> Result<()> {
        self.executor.run("sudo", &["dnf", "makecache"])?;
        Ok(())
    }

    fn is_installed(&self, package: &str) -> bool {
        self.executor
            .run_unchecked("rpm", &["-q", package])
            .is_ok_and(|r| r.success)
    }

    fn setup_special_package(&self, package: &str) -> Result<bool> {
        let Some(copr) = Self::copr_for(package) else {
            return Ok(false);
        };
        self.executor
            .run("sudo", &["dnf", "copr", "enable", "-y", copr])?;
        Ok(true)
    }
}

/// Arch Linux pacman handle.
pub struct Pacman {
    executor: Arc<dyn Executor>,
}

impl Pacman {
    /// Create a pacman handle using the given executor.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }
}

impl PackageManager for Pacman {
    fn name(&self) -> &str {
        "pacman"
    }

    fn install(&self, package: &str) -> Result<()> {
        self.executor.run(
            "sudo",
            &["pacman", "-S", "--needed", "--noconfirm", package],
        )?;
        Ok(())
    }

    fn uninstall(&self, package: &str) -> Result<()> {
        self.executor
            .run("sudo", &["pacman", "-R", "--noconfirm", package])?;
        Ok(())
    }

    fn update(&self) -> Result<()> {
        self.executor.run("sudo", &["pacman", "-Sy"])?;
        Ok(())
    }

    fn is_installed(&self, package: &str) -> bool {
        self.executor
            .run_unchecked("pacman", &["-Q", package])
            .is_ok_and(|r| r.success)
    }
}

/// Homebrew handle (macOS and Linuxbrew).
pub struct Brew {
    executor: Arc<dyn Executor>,
}

impl Brew {
    /// Create a brew handle using the given executor.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    /// Known taps for packages absent from homebrew-core.
    fn tap_for(package: &str) -> Option<&'static str> {
        match package {
            "terraform" => Some("hashicorp/tap"),
            _ => None,
        }
    }
}

impl PackageManager for Brew {
    fn name(&self) -> &str {
        "brew"
    }

    fn install(&self, package: &str) -> Result<()> {
        self.executor.run("brew", &["install", package])?;
        Ok(())
    }

    fn uninstall(&self, package: &str) -> Result<()> {
        self.executor.run("brew", &["uninstall", package])?;
        Ok(())
    }

    fn update(&self) -> Result<()> {
        self.executor.run("brew", &["update"])?;
        Ok(())
    }

    fn is_installed(&self, package: &str) -> bool {
        self.executor
            .run_unchecked("brew", &["list", package])
            .is_ok_and(|r| r.success)
    }

    fn setup_special_package(&self, package: &str) -> Result<bool> {
        let Some(tap) = Self::tap_for(package) else {
            return Ok(false);
        };
        self.executor.run("brew", &["tap", tap])?;
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::exec::test_helpers::MockExecutor;

    fn apt_with(executor: MockExecutor) -> Apt {
        Apt::new(Arc::new(executor))
    }

    #[test]
    fn apt_install_succeeds() {
        let manager = apt_with(MockExecutor::ok(""));
        assert!(manager.install("git").is_ok());
    }

    #[test]
    fn apt_install_propagates_failure() {
        let manager = apt_with(MockExecutor::fail());
        assert!(manager.install("git").is_err());
    }

    #[test]
    fn apt_is_installed_true_when_dpkg_succeeds() {
        let manager = apt_with(MockExecutor::ok("Status: install ok installed"));
        assert!(manager.is_installed("git"));
    }

    #[test]
    fn apt_is_installed_false_when_dpkg_fails() {
        let manager = apt_with(MockExecutor::fail());
        assert!(!manager.is_installed("git"));
    }

    #[test]
    fn apt_special_package_adds_ppa() {
        let manager = apt_with(MockExecutor::ok(""));
        assert!(manager.setup_special_package("neovim").unwrap());
    }

    #[test]
    fn apt_special_package_unknown_is_not_special() {
        // No executor response needed: unknown packages never run a command.
        let manager = apt_with(MockExecutor::with_responses(vec![]));
        assert!(!manager.setup_special_package("ripgrep").unwrap());
    }

    #[test]
    fn apt_special_package_bootstrap_failure_is_error() {
        let manager = apt_with(MockExecutor::fail());
        assert!(manager.setup_special_package("neovim").is_err());
    }

    #[test]
    fn dnf_special_package_enables_copr() {
        let manager = Dnf::new(Arc::new(MockExecutor::ok("")));
        assert!(manager.setup_special_package("lazygit").unwrap());
    }

    #[test]
    fn pacman_has_no_special_packages() {
        let manager = Pacman::new(Arc::new(MockExecutor::with_responses(vec![])));
        assert!(!manager.setup_special_package("paru").unwrap());
    }

    #[test]
    fn brew_is_installed_checks_list() {
        let manager = Brew::new(Arc::new(MockExecutor::ok("fzf")));
        assert!(manager.is_installed("fzf"));
    }

    #[test]
    fn manager_names() {
        let executor: Arc<dyn Executor> = Arc::new(MockExecutor::with_responses(vec![]));
        assert_eq!(Apt::new(Arc::clone(&executor)).name(), "apt");
        assert_eq!(Dnf::new(Arc::clone(&executor)).name(), "dnf");
        assert_eq!(Pacman::new(Arc::clone(&executor)).name(), "pacman");
        assert_eq!(Brew::new(executor).name(), "brew");
    }
}
