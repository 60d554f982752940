//! Interactive credential prompt.

use std::io::{self, Write};

use anyhow::{bail, Result};
use qrzcache_core::auth::{CredentialSource, Credentials};

/// Environment variable checked for the password before prompting.
const PASSWORD_ENV: &str = "QRZ_PASSWORD";

/// Asks on the terminal for whatever was not supplied up front.
pub struct TerminalPrompt {
    username: Option<String>,
    default_username: Option<String>,
    /// Username of the last credentials handed out
    pub used_username: Option<String>,
}

impl TerminalPrompt {
    pub fn new(username: Option<String>, default_username: Option<String>) -> Self {
        Self {
            username: username.filter(|u| !u.trim().is_empty()),
            default_username,
            used_username: None,
        }
    }

    fn prompt_username(&self) -> Result<String> {
        match self.default_username {
            Some(ref last) => print!("QRZ Username [{}]: ", last),
            None => print!("QRZ Username: "),
        }
        io::stdout().flush()?;

        let mut username = String::new();
        io::stdin().read_line(&mut username)?;
        Ok(choose_username(&username, self.default_username.as_deref()))
    }

    fn prompt_password() -> Result<String> {
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            if !password.is_empty() {
                return Ok(password);
            }
        }
        let password = rpassword::prompt_password("QRZ Password: ")?;
        Ok(password)
    }
}

impl CredentialSource for TerminalPrompt {
    fn credentials(&mut self) -> Result<Credentials> {
        let username = match self.username {
            Some(ref username) => username.trim().to_string(),
            None => self.prompt_username()?,
        };
        let password = Self::prompt_password()?;

        if username.is_empty() || password.is_empty() {
            bail!("Username and password required");
        }

        self.used_username = Some(username.clone());
        Ok(Credentials::new(username, password))
    }
}

/// Typed input wins; a blank line falls back to the remembered username.
fn choose_username(input: &str, default: Option<&str>) -> String {
    let typed = input.trim();
    if typed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        typed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_username() {
        assert_eq!(choose_username("aa7bq\n", Some("w1aw")), "aa7bq");
        assert_eq!(choose_username("\n", Some("w1aw")), "w1aw");
        assert_eq!(choose_username("  \n", None), "");
    }

    #[test]
    fn test_blank_username_flag_is_ignored() {
        let prompt = TerminalPrompt::new(Some("  ".to_string()), None);
        assert!(prompt.username.is_none());

        let prompt = TerminalPrompt::new(Some("aa7bq".to_string()), None);
        assert_eq!(prompt.username.as_deref(), Some("aa7bq"));
    }
}
