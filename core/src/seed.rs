/// Fixed conversations loaded at start, standing in for a real backend
use crate::model::{Contact, Conversation, ConversationStatus, Handler, MediaAttachment, Message, Sender};
use chrono::{DateTime, Duration, Local};

const AVATAR_BASE: &str = "https://api.dicebear.com/7.x/avataaars/svg?seed=";

fn minutes_ago(now: DateTime<Local>, minutes: f64) -> DateTime<Local> {
    now - Duration::seconds((minutes * 60.0) as i64)
}

fn hours_ago(now: DateTime<Local>, hours: f64) -> DateTime<Local> {
    minutes_ago(now, hours * 60.0)
}

fn days_ago(now: DateTime<Local>, days: f64) -> DateTime<Local> {
    hours_ago(now, days * 24.0)
}

fn contact(name: &str, number: &str, seed: &str) -> Contact {
    Contact::new(name, number, format!("{}{}", AVATAR_BASE, seed))
}

fn seeded(id: &str, sender: Sender, content: &str, at: DateTime<Local>, read: bool) -> Message {
    Message::new(sender, content, at, read).with_id(id)
}

/// Seed conversations relative to `now`, in list order
pub fn conversations(now: DateTime<Local>) -> Vec<Conversation> {
    vec![
        Conversation::new(
            "1",
            contact("Maria Silva", "+55 11 98765-4321", "Maria"),
            ConversationStatus::Active,
            Handler::Ai,
            vec![
                seeded(
                    "m1",
                    Sender::Customer,
                    "Olá! Gostaria de saber sobre o status do meu pedido #12345",
                    minutes_ago(now, 25.0),
                    true,
                ),
                seeded(
                    "m2",
                    Sender::Ai,
                    "Olá Maria! Vou verificar o status do seu pedido agora mesmo.",
                    minutes_ago(now, 24.0),
                    true,
                ),
                seeded(
                    "m3",
                    Sender::Ai,
                    "Seu pedido #12345 está em processo de separação e será enviado hoje. Você receberá o código de rastreamento por e-mail em breve.",
                    minutes_ago(now, 23.0),
                    false,
                ),
                seeded(
                    "m4",
                    Sender::Customer,
                    "Obrigada pela informação! Mas não recebi nenhum e-mail de confirmação ainda. Pode verificar se o endereço de e-mail está correto?",
                    minutes_ago(now, 22.0),
                    false,
                ),
                seeded(
                    "m5",
                    Sender::Customer,
                    "Segue o comprovante da compra.",
                    minutes_ago(now, 20.0),
                    false,
                )
                .with_media(MediaAttachment::Image {
                    url: "https://cdn.example.com/uploads/comprovante-12345.jpg".to_string(),
                }),
            ],
        ),
        Conversation::new(
            "2",
            contact("João Pereira", "+55 21 99876-5432", "João"),
            ConversationStatus::Waiting,
            Handler::Agent,
            vec![
                seeded(
                    "m1",
                    Sender::Customer,
                    "Bom dia! Preciso trocar um produto que comprei na semana passada",
                    hours_ago(now, 13.0),
                    true,
                ),
                seeded(
                    "m2",
                    Sender::Ai,
                    "Olá João! Claro, podemos te ajudar com a troca. Pode me informar o número do pedido e qual produto você deseja trocar?",
                    hours_ago(now, 12.8),
                    true,
                ),
                seeded(
                    "m3",
                    Sender::Customer,
                    "Pedido #54321, quero trocar a camisa tamanho M por uma tamanho G",
                    hours_ago(now, 12.5),
                    true,
                ),
                seeded(
                    "m4",
                    Sender::Ai,
                    "Transferindo para um atendente humano...",
                    hours_ago(now, 12.2),
                    true,
                ),
            ],
        ),
        Conversation::new(
            "3",
            contact("Ana Oliveira", "+55 31 97654-3210", "Ana"),
            ConversationStatus::Resolved,
            Handler::Ai,
            vec![
                seeded(
                    "m1",
                    Sender::Customer,
                    "Estou com problemas para fazer login no site",
                    days_ago(now, 2.2),
                    true,
                ),
                seeded(
                    "m2",
                    Sender::Ai,
                    "Olá Ana! Sinto muito pelo inconveniente. Vamos resolver isso juntos. Você está tentando fazer login com qual e-mail?",
                    days_ago(now, 2.15),
                    true,
                ),
                seeded(
                    "m3",
                    Sender::Customer,
                    "Obrigada pela ajuda!",
                    days_ago(now, 2.0),
                    true,
                ),
            ],
        ),
        Conversation::new(
            "4",
            contact("Carlos Souza", "+55 41 96543-2109", "Carlos"),
            ConversationStatus::Active,
            Handler::Agent,
            vec![
                seeded(
                    "m1",
                    Sender::Customer,
                    "O produto chegou com defeito, gravei um vídeo mostrando o problema",
                    hours_ago(now, 3.0),
                    true,
                )
                .with_media(MediaAttachment::Video {
                    url: "https://cdn.example.com/uploads/defeito.mp4".to_string(),
                    thumbnail: Some("https://cdn.example.com/uploads/defeito.jpg".to_string()),
                    duration_secs: 42,
                }),
                seeded(
                    "m2",
                    Sender::Agent,
                    "Olá Carlos, sou a Beatriz. Já estou analisando o vídeo e vou abrir a troca para você.",
                    hours_ago(now, 2.5),
                    true,
                ),
                seeded(
                    "m3",
                    Sender::Customer,
                    "Mandei um áudio explicando melhor",
                    hours_ago(now, 1.0),
                    false,
                )
                .with_media(MediaAttachment::Audio {
                    url: "https://cdn.example.com/uploads/explicacao.ogg".to_string(),
                    thumbnail: None,
                    duration_secs: 38,
                }),
            ],
        ),
    ]
}
