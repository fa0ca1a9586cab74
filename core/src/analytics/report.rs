/// Reporting series for the analytics page.
///
/// These are fixed sample figures until a real history source exists.
use serde::Serialize;

/// Conversations opened vs resolved over one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodVolume {
    pub label: &'static str,
    pub conversations: u32,
    pub resolved: u32,
}

impl PeriodVolume {
    const fn new(label: &'static str, conversations: u32, resolved: u32) -> Self {
        Self {
            label,
            conversations,
            resolved,
        }
    }

    pub fn resolution_rate(&self) -> f64 {
        if self.conversations == 0 {
            0.0
        } else {
            self.resolved as f64 / self.conversations as f64
        }
    }
}

/// A labelled percentage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Share {
    pub label: &'static str,
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadlineMetric {
    pub label: &'static str,
    pub value: &'static str,
}

pub fn weekly() -> Vec<PeriodVolume> {
    vec![
        PeriodVolume::new("Seg", 12, 10),
        PeriodVolume::new("Ter", 19, 15),
        PeriodVolume::new("Qua", 15, 12),
        PeriodVolume::new("Qui", 21, 18),
        PeriodVolume::new("Sex", 25, 22),
        PeriodVolume::new("Sáb", 17, 14),
        PeriodVolume::new("Dom", 8, 7),
    ]
}

pub fn monthly() -> Vec<PeriodVolume> {
    vec![
        PeriodVolume::new("Jan", 120, 100),
        PeriodVolume::new("Fev", 150, 130),
        PeriodVolume::new("Mar", 180, 160),
        PeriodVolume::new("Abr", 210, 190),
        PeriodVolume::new("Mai", 250, 220),
        PeriodVolume::new("Jun", 320, 290),
    ]
}

/// Resolved by the AI vs transferred to an agent
pub fn handoff_split() -> Vec<Share> {
    vec![
        Share { label: "Resolvidos pela IA", percent: 68 },
        Share { label: "Transferidos para agente", percent: 32 },
    ]
}

/// Most frequent contact reasons
pub fn topics() -> Vec<Share> {
    vec![
        Share { label: "Status do pedido", percent: 38 },
        Share { label: "Problemas técnicos", percent: 24 },
        Share { label: "Dúvidas sobre produto", percent: 19 },
        Share { label: "Troca ou devolução", percent: 14 },
        Share { label: "Outros", percent: 5 },
    ]
}

pub fn headline_metrics() -> Vec<HeadlineMetric> {
    vec![
        HeadlineMetric { label: "Tempo médio de resposta", value: "45 seg" },
        HeadlineMetric { label: "Tempo médio até resolução", value: "4:30 min" },
        HeadlineMetric { label: "Taxa de resolução pela IA", value: "68%" },
        HeadlineMetric { label: "Satisfação do cliente", value: "4.7/5" },
    ]
}

/// Text bar of `width` cells filled to `value / max`
pub fn bar(value: u32, max: u32, width: usize) -> String {
    let filled = if max == 0 {
        0
    } else {
        ((value as f64 / max as f64) * width as f64).round() as usize
    };
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
