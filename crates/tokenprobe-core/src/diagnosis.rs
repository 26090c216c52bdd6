#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The provider rejected the refresh token as consumed or expired.
    RefreshTokenRejected,
    InvalidClient,
    Unknown,
}

pub fn classify(message: &str) -> FailureKind {
    if message.contains("invalid_request") && message.contains("Refresh token") {
        FailureKind::RefreshTokenRejected
    } else if message.contains("invalid_client") {
        FailureKind::InvalidClient
    } else {
        FailureKind::Unknown
    }
}

impl FailureKind {
    pub fn remediation(self) -> &'static [&'static str] {
        match self {
            Self::RefreshTokenRejected => &[
                "Diagnosis: Refresh token has been consumed or expired",
                "Common causes:",
                "1. Another client (like kubectl) already used this refresh token",
                "2. Refresh token has expired (check Dex configuration)",
                "3. Dex server was restarted, invalidating tokens",
                "",
                "Solutions:",
                "1. Re-authenticate with kubectl to get fresh tokens:",
                "   kubectl --user oidc get pods -A",
                "2. Clear token cache and re-authenticate:",
                "   rm -rf ~/.kube/cache/oidc-login && kubectl --user oidc get pods -A",
            ],
            Self::InvalidClient => &[
                "Diagnosis: Client credentials are invalid",
                "Solutions:",
                "1. Check if using correct flow type (set DEX_FLOW=device-code if needed)",
                "2. Verify Dex client configuration matches test client settings",
            ],
            Self::Unknown => &[
                "General troubleshooting:",
                "1. Check Dex server logs: make logs",
                "2. Verify network connectivity to Dex",
                "3. Check if certificates are trusted",
            ],
        }
    }
}
