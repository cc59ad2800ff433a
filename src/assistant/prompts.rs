//! Prompt and offline text builders. Everything here is a pure function of
//! the property record so demo output is reproducible.

use crate::models::property::{PricePoint, PropertyRecord, VerificationLevel};

/// Used in the risk section when every document is verified.
pub const DEFAULT_RISK_CHECK: &str = "Future road widening plans";

/// Rupee amount with Indian digit grouping: 12500000 -> "1,25,00,000".
pub fn format_inr(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// Dollar amount with thousands grouping: 150000 -> "150,000".
pub fn format_usd(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Compound annual growth of the per-sq-ft price between the first and last
/// points of the series. The span comes from the year labels, or the number
/// of steps when the labels are not numeric.
pub fn compound_annual_growth(history: &[PricePoint]) -> Option<f64> {
    let (first, last) = match (history.first(), history.last()) {
        (Some(first), Some(last)) if history.len() >= 2 => (first, last),
        _ => return None,
    };
    if first.price == 0 {
        return None;
    }

    let span = match (first.year.trim().parse::<i32>(), last.year.trim().parse::<i32>()) {
        (Ok(start), Ok(end)) => match end.checked_sub(start) {
            Some(years) if years > 0 => years as f64,
            _ => return None,
        },
        _ => (history.len() - 1) as f64,
    };

    let ratio = last.price as f64 / first.price as f64;
    Some(ratio.powf(1.0 / span) - 1.0)
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let joined = names.collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        "None".to_string()
    } else {
        joined
    }
}

fn level_note(level: VerificationLevel) -> &'static str {
    match level {
        VerificationLevel::Platinum => "Highest security",
        VerificationLevel::Gold => "High security",
        VerificationLevel::Basic => "Standard checks only",
    }
}

pub fn greeting(property: &PropertyRecord) -> String {
    format!(
        "Namaste! I am the Homeward Guide. I have analyzed the documents for {}. \
         Feel free to ask me about the zoning, title clarity, or nearby developments.",
        property.title
    )
}

pub fn chat_briefing(property: &PropertyRecord) -> String {
    format!(
        r#"You are "Homeward Guide", an expert AI real estate consultant for the "Homeward Plots" platform.
Your audience is Non-Resident Indians (NRIs) looking to buy land in India.

Current Property Context:
Title: {title}
Location: {city}, {state}
Price: ₹{inr} (${usd})
Area: {area} sq ft
Verification Level: {level}
Documents Verified: {verified}
Missing/Pending Documents: {pending}

Your Goal:
1. Build trust. Be professional, cautious, and transparent.
2. Explain Indian legal terms (like Khata, Patta, EC) simply if asked.
3. Highlight the specific verified status of THIS property.
4. If a critical document is missing, warn the user gently but clearly.
5. Keep answers concise (under 150 words) unless detailed analysis is requested.

Do not invent facts. If you don't know, suggest they use the "Request Legal Opinion" service ($350)."#,
        title = property.title,
        city = property.location.city,
        state = property.location.state,
        inr = format_inr(property.price.inr),
        usd = format_usd(property.price.usd),
        area = property.specs.area,
        level = property.verification_level,
        verified = join_names(property.verified_documents().map(|d| d.name.as_str())),
        pending = join_names(property.pending_documents().map(|d| d.name.as_str())),
    )
}

pub fn report_prompt(property: &PropertyRecord) -> String {
    let series = property
        .price_history
        .iter()
        .map(|p| format!("{}: ₹{}", p.year, p.price))
        .collect::<Vec<_>>()
        .join(", ");
    let risk_focus = match property.first_unverified_document() {
        Some(doc) => format!(
            "Call out the pending document \"{}\" as the primary risk.",
            doc.name
        ),
        None => "All listed documents are verified; cover residual risks.".to_string(),
    };

    format!(
        r#"Generate a structured investment analysis report for a land property with the following details:
Title: {title}
City: {city}, State: {state}
Current Price: ₹{inr} (${usd})
Price per SqFt: ₹{per_sq_ft}
Area: {area} sq ft
Price History (Year: Price/sqft): {series}
Verification Level: {level}

Please output the report in Markdown format with the following sections:
1. **Executive Summary**: A 2-sentence overview.
2. **ROI Analysis**: Calculate the approximate CAGR based on the price history provided.
3. **Location Potential**: Analyze the potential of {district}, {city} based on general real estate knowledge.
4. **Risk Assessment**: Based on the fact that this is a {level} verified property. {risk_focus}

Tone: Professional, analytical, and cautious (trust-building)."#,
        title = property.title,
        city = property.location.city,
        state = property.location.state,
        inr = format_inr(property.price.inr),
        usd = format_usd(property.price.usd),
        per_sq_ft = property.price.price_per_sq_ft,
        area = property.specs.area,
        series = if series.is_empty() { "None".to_string() } else { series },
        level = property.verification_level,
        district = property.location.district,
        risk_focus = risk_focus,
    )
}

pub fn demo_chat_reply(property: &PropertyRecord) -> String {
    format!(
        "Demo Mode: Configure GEMINI_API_KEY in the environment to chat with the real AI. \
         {} carries {} verification; see the Documents tab for its verified titles.",
        property.title, property.verification_level
    )
}

pub fn demo_report(property: &PropertyRecord) -> String {
    let roi = match (
        compound_annual_growth(&property.price_history),
        property.price_history.first(),
        property.price_history.last(),
    ) {
        (Some(cagr), Some(first), Some(last)) => format!(
            "Price per sq ft moved from ₹{} in {} to ₹{} in {}, a compound annual growth rate of about {:.1}%.",
            first.price,
            first.year,
            last.price,
            last.year,
            cagr * 100.0
        ),
        _ => "Not enough price history to estimate a growth rate.".to_string(),
    };
    let risk_check = property
        .first_unverified_document()
        .map(|d| d.name.as_str())
        .unwrap_or(DEFAULT_RISK_CHECK);

    format!(
        "# Demo Investment Report\n\
         **Note:** Configure GEMINI_API_KEY to generate real AI analysis.\n\
         \n\
         ## Executive Summary\n\
         {title} is a {area} sq ft plot in {city}, {state}, listed at ₹{inr} (${usd}).\n\
         \n\
         ## ROI Analysis\n\
         {roi}\n\
         \n\
         ## Location Potential\n\
         Based on historical data, {district} shows a strong upward trend. Located in a developing corridor of {city}.\n\
         \n\
         ## Risk Assessment\n\
         - Check specifically for: {risk_check}\n\
         - Verification Level: {level} ({note})",
        title = property.title,
        area = property.specs.area,
        city = property.location.city,
        state = property.location.state,
        inr = format_inr(property.price.inr),
        usd = format_usd(property.price.usd),
        roi = roi,
        district = property.location.district,
        risk_check = risk_check,
        level = property.verification_level,
        note = level_note(property.verification_level),
    )
}
