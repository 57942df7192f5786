//! Plain-text rendering of transcript entries, shared by the terminal
//! output and the transcript log.

use crate::api::Identification;
use crate::core::message::{Message, Payload, PendingOperation};

pub const USER_LABEL: &str = "You";
pub const ASSISTANT_LABEL: &str = "Lumon";

/// Render one entry as text lines. Returns `None` for pending indicators,
/// which have no lasting content.
pub fn render_message(message: &Message) -> Option<String> {
    let label = if message.is_user() {
        USER_LABEL
    } else {
        ASSISTANT_LABEL
    };
    let body = match message.payload() {
        Payload::Text(text) => text.clone(),
        Payload::Image(image) => format!(
            "[image: {} ({}, {})]",
            image.file_name,
            image.media_type,
            format_bytes(image.size)
        ),
        Payload::Identification(identification) => render_identification(identification),
        Payload::Pending(_) => return None,
    };
    Some(format!("{label}: {body}"))
}

/// Status line shown while a request is outstanding.
pub fn pending_label(operation: PendingOperation) -> &'static str {
    match operation {
        PendingOperation::Converse => "Lumon is typing…",
        PendingOperation::Identify => "Lumon is looking at your photo…",
    }
}

pub fn render_identification(identification: &Identification) -> String {
    let mut lines = Vec::new();

    let mut headline = format!("🌿 {}", identification.plant_name);
    if let Some(scientific) = identification
        .scientific_name
        .as_deref()
        .filter(|name| !name.eq_ignore_ascii_case(&identification.plant_name))
    {
        headline.push_str(&format!(" ({scientific})"));
    }
    if let Some(confidence) = identification.confidence_percent() {
        headline.push_str(&format!(" - {}% confidence", confidence.round()));
    }
    lines.push(headline);

    if !identification.common_names.is_empty() {
        lines.push(format!(
            "Also known as: {}",
            identification.common_names.join(", ")
        ));
    }
    if let Some(family) = known(identification.family.as_deref()) {
        lines.push(format!("Family: {family}"));
    }
    if let Some(region) = known(identification.region.as_deref()) {
        lines.push(format!("Native region: {region}"));
    }
    if let Some(description) = identification.description.as_deref() {
        lines.push(String::new());
        lines.push(description.trim().to_string());
    }
    if !identification.care_tips.is_empty() {
        lines.push(String::new());
        lines.push("Care tips:".to_string());
        lines.extend(identification.care_tips.iter().map(|tip| format!("  • {tip}")));
    }
    if let Some(edible) = identification.edible {
        lines.push(format!("Edible: {}", if edible { "yes" } else { "no" }));
    }
    if let Some(toxicity) = identification.toxicity.filter(|level| *level > 0) {
        lines.push(format!("⚠️  Toxicity level: {toxicity}"));
    }
    if !identification.diseases.is_empty() {
        lines.push(format!(
            "Common problems: {}",
            identification.diseases.join(", ")
        ));
    }
    if let Some(url) = identification.wiki_url.as_deref() {
        lines.push(format!("Learn more: {url}"));
    }

    lines.join("\n")
}

// The server fills missing taxonomy with "Unknown".
fn known(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("unknown"))
}

fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;
    if bytes >= MIB {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::{Author, ImageRef, MessageId};
    use chrono::{DateTime, Utc};

    fn message(author: Author, payload: Payload) -> Message {
        Message::new(MessageId::new(1), author, payload, DateTime::<Utc>::UNIX_EPOCH)
    }

    #[test]
    fn text_entries_are_labelled_by_author() {
        let user = message(Author::User, Payload::Text("hello".to_string()));
        let assistant = message(Author::Assistant, Payload::Text("hi!".to_string()));
        assert_eq!(render_message(&user).as_deref(), Some("You: hello"));
        assert_eq!(render_message(&assistant).as_deref(), Some("Lumon: hi!"));
    }

    #[test]
    fn pending_entries_do_not_render() {
        let pending = message(
            Author::Assistant,
            Payload::Pending(PendingOperation::Converse),
        );
        assert_eq!(render_message(&pending), None);
    }

    #[test]
    fn image_queries_show_file_details() {
        let image = message(
            Author::User,
            Payload::Image(ImageRef {
                file_name: "rose.jpg".to_string(),
                media_type: "image/jpeg".to_string(),
                size: 2048,
            }),
        );
        assert_eq!(
            render_message(&image).as_deref(),
            Some("You: [image: rose.jpg (image/jpeg, 2.0 KB)]")
        );
    }

    #[test]
    fn identification_lists_known_details_only() {
        let identification = Identification {
            plant_name: "Pothos".to_string(),
            scientific_name: Some("Epipremnum aureum".to_string()),
            confidence: Some(64.4),
            description: Some("A trailing vine.".to_string()),
            care_tips: vec!["Let soil dry between waterings".to_string()],
            family: Some("Unknown".to_string()),
            toxicity: Some(0),
            wiki_url: Some("https://en.wikipedia.org/wiki/Pothos".to_string()),
            ..Default::default()
        };
        let rendered = render_identification(&identification);
        let expected = "🌿 Pothos (Epipremnum aureum) - 64% confidence\n\
\n\
A trailing vine.\n\
\n\
Care tips:\n  • Let soil dry between waterings\n\
Learn more: https://en.wikipedia.org/wiki/Pothos";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn confidence_reads_fractions_and_percentages() {
        let fraction = Identification {
            plant_name: "Dionaea muscipula".to_string(),
            confidence: Some(0.88),
            ..Default::default()
        };
        assert_eq!(
            render_identification(&fraction),
            "🌿 Dionaea muscipula - 88% confidence"
        );

        let percentage = Identification {
            confidence: Some(87.5),
            ..fraction
        };
        assert!(render_identification(&percentage).contains(" - 88% confidence"));
    }
}
