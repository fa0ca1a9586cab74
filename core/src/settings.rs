/// Desk settings: WhatsApp integration, AI behaviour, notifications.
/// In-memory only; nothing is written to disk.
use crate::error::{DeskError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_WELCOME_MESSAGE: &str =
    "Olá! Bem-vindo ao nosso atendimento. Como posso ajudar você hoje?";
pub const DEFAULT_SYSTEM_PROMPT: &str = "Você é um assistente de atendimento ao cliente amigável e prestativo. Responda às dúvidas com cortesia e precisão. Se não souber a resposta, ou se for uma situação complexa, sugira transferir para um atendente humano.";

pub const MIN_TRANSFER_THRESHOLD: u32 = 1;
pub const MAX_TRANSFER_THRESHOLD: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatsappSettings {
    pub api_key: String,
    pub number: String,
    pub welcome_message: String,
}

impl Default for WhatsappSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            number: String::new(),
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
        }
    }
}

impl WhatsappSettings {
    pub fn validate(&self) -> Result<()> {
        let number = self.number.trim();
        if !number.is_empty() && !number.starts_with('+') {
            return Err(DeskError::InvalidSettings(format!(
                "WhatsApp number must include the country code (e.g. +55 11 98765-4321), got '{}'",
                number
            )));
        }
        Ok(())
    }

    /// API key with all but the last four characters hidden
    pub fn masked_api_key(&self) -> String {
        let visible: String = self
            .api_key
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        let hidden = self.api_key.chars().count().saturating_sub(4);
        format!("{}{}", "•".repeat(hidden), visible)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiSettings {
    /// Schedule a canned reply after every customer message
    pub auto_respond: bool,
    /// Messages the AI handles before suggesting a human
    pub transfer_threshold: u32,
    pub system_prompt: String,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            auto_respond: true,
            transfer_threshold: 3,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl AiSettings {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_TRANSFER_THRESHOLD..=MAX_TRANSFER_THRESHOLD).contains(&self.transfer_threshold) {
            return Err(DeskError::InvalidSettings(format!(
                "transfer threshold must be between {} and {}, got {}",
                MIN_TRANSFER_THRESHOLD, MAX_TRANSFER_THRESHOLD, self.transfer_threshold
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub email: bool,
    pub browser: bool,
    pub sound: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email: true,
            browser: true,
            sound: false,
        }
    }
}

/// One of the notification switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationChannel {
    Email,
    Browser,
    Sound,
}

impl NotificationSettings {
    /// Flip one switch, returning its new state
    pub fn toggle(&mut self, channel: NotificationChannel) -> bool {
        let switch = match channel {
            NotificationChannel::Email => &mut self.email,
            NotificationChannel::Browser => &mut self.browser,
            NotificationChannel::Sound => &mut self.sound,
        };
        *switch = !*switch;
        *switch
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub whatsapp: WhatsappSettings,
    pub ai: AiSettings,
    pub notifications: NotificationSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.whatsapp.validate()?;
        self.ai.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.ai.auto_respond);
        assert_eq!(settings.ai.transfer_threshold, 3);
        assert_eq!(settings.whatsapp.welcome_message, DEFAULT_WELCOME_MESSAGE);
        assert!(settings.notifications.email);
        assert!(!settings.notifications.sound);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_threshold_bounds() {
        let mut ai = AiSettings::default();
        ai.transfer_threshold = 0;
        assert!(matches!(ai.validate(), Err(DeskError::InvalidSettings(_))));
        ai.transfer_threshold = 11;
        assert!(ai.validate().is_err());
        ai.transfer_threshold = 10;
        assert!(ai.validate().is_ok());
    }

    #[test]
    fn test_number_needs_country_code() {
        let mut whatsapp = WhatsappSettings::default();
        whatsapp.number = "11 98765-4321".to_string();
        assert!(whatsapp.validate().is_err());
        whatsapp.number = "+55 11 98765-4321".to_string();
        assert!(whatsapp.validate().is_ok());
    }

    #[test]
    fn test_masked_api_key() {
        let mut whatsapp = WhatsappSettings::default();
        assert_eq!(whatsapp.masked_api_key(), "");
        whatsapp.api_key = "sk-abcdef1234".to_string();
        assert_eq!(whatsapp.masked_api_key(), "•••••••••1234");
    }

    #[test]
    fn test_toggle_notification_channel() {
        let mut notifications = NotificationSettings::default();
        assert!(notifications.toggle(NotificationChannel::Sound));
        assert!(!notifications.toggle(NotificationChannel::Email));
        assert!(notifications.browser);
        assert_eq!(
            notifications,
            NotificationSettings {
                email: false,
                browser: true,
                sound: true,
            }
        );
    }
}
