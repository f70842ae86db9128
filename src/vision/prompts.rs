//! Prompt sent with every card image.

/// Default extraction instruction.
pub const DEFAULT_CARD_PROMPT: &str = "Extract the following information from this business card: \
name, business_name, job_title, contact_number, email, website, and address. \
Return the data in JSON format using exactly those keys. \
If the image contains several cards, return a JSON array with one object per card. \
Use null for any field that is not present on the card.";
