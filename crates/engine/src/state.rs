//! Scan state carried from one line to the next.

/// Two independent flags threaded through the line scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    non_root_user_declared: bool,
    package_install_open: bool,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A group or user creation command has been seen. Sticky for the rest of
    /// the scan.
    pub fn declare_non_root_user(&mut self) {
        self.non_root_user_declared = true;
    }

    pub fn non_root_user_declared(&self) -> bool {
        self.non_root_user_declared
    }

    /// Open the package-install block. Returns false if it was already open;
    /// opening twice has no further effect.
    pub fn open_package_install(&mut self) -> bool {
        let newly_opened = !self.package_install_open;
        self.package_install_open = true;
        newly_opened
    }

    /// Close the block. Only the first install line seen while open does this.
    pub fn close_package_install(&mut self) {
        self.package_install_open = false;
    }

    pub fn package_install_open(&self) -> bool {
        self.package_install_open
    }
}
