/// Canned replies standing in for the AI / agent backend
use crate::model::Handler;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::Mutex;

pub const REPLY_TEMPLATES: [&str; 5] = [
    "Entendi sua solicitação. Vou verificar isso para você imediatamente.",
    "Obrigado por sua mensagem. Estamos processando seu pedido.",
    "Compreendo sua situação. Deixe-me ver como podemos resolver isso.",
    "Agradeço por entrar em contato. Vamos trabalhar juntos para solucionar seu problema.",
    "Recebi sua mensagem. Estou consultando as informações necessárias para te ajudar.",
];

pub const THANKS_KEYWORD: &str = "obrigad";
pub const THANKS_REPLY: &str =
    "Foi um prazer te ajudar! Se precisar de mais alguma coisa, é só me avisar.";

/// Produces the text of an automatic reply
pub trait Responder: Send + Sync {
    fn reply(&self, customer_text: &str, handler: Handler) -> String;
}

/// Picks a template at random, except for thank-you messages
pub struct CannedResponder {
    rng: Mutex<StdRng>,
}

impl CannedResponder {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic sequence of picks, for tests and reproducible demos
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for CannedResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl Responder for CannedResponder {
    fn reply(&self, customer_text: &str, _handler: Handler) -> String {
        if customer_text.to_lowercase().contains(THANKS_KEYWORD) {
            return THANKS_REPLY.to_string();
        }

        // A poisoned lock only means another reply panicked mid-pick; the rng is still usable
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        REPLY_TEMPLATES
            .choose(&mut *rng)
            .copied()
            .unwrap_or(REPLY_TEMPLATES[0])
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thanks_keyword_wins() {
        let responder = CannedResponder::with_seed(7);
        assert_eq!(responder.reply("Muito OBRIGADA!", Handler::Ai), THANKS_REPLY);
        assert_eq!(responder.reply("obrigado pela ajuda", Handler::Agent), THANKS_REPLY);
    }

    #[test]
    fn test_reply_comes_from_pool() {
        let responder = CannedResponder::new();
        for _ in 0..20 {
            let reply = responder.reply("Onde está meu pedido?", Handler::Ai);
            assert!(REPLY_TEMPLATES.contains(&reply.as_str()));
        }
    }

    #[test]
    fn test_seeded_responders_agree() {
        let a = CannedResponder::with_seed(42);
        let b = CannedResponder::with_seed(42);
        for _ in 0..5 {
            assert_eq!(a.reply("oi", Handler::Ai), b.reply("oi", Handler::Ai));
        }
    }
}
