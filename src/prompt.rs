//! Advisory prompt templates.
//!
//! Builds the plan and follow-up prompts from a client profile and the
//! location's market table. Field values are embedded as-is: nothing is
//! escaped or truncated, so a crafted name or question can steer the
//! model. That is a known limitation of this layer.

use serde::Deserialize;

use crate::types::{AdvisorError, MarketRow, MarketTable, Profile};

const NOT_APPLICABLE: &str = "N/A";

/// Report sections requested from the backend, in order.
pub const PLAN_SECTIONS: [(&str, &str); 5] = [
    ("Executive Summary", "A brief summary of the recommendation."),
    ("Buy vs. Build Analysis", "Pros, cons, and rough cost estimates for both."),
    ("Financial Strategy", "Affordability, savings plan, and financing options."),
    ("Actionable Steps", "A step-by-step plan for the next 1-2 years."),
    ("Friendly Closing", "A positive and motivational closing statement."),
];

/// Country and currency the advice is framed for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Region {
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_country() -> String {
    "India".to_string()
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

impl Default for Region {
    fn default() -> Self {
        Self {
            country: default_country(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    region: Region,
}

impl PromptBuilder {
    pub fn new(region: Region) -> Self {
        Self { region }
    }

    /// Prompt for the full five-section advisory report.
    pub fn build_plan_prompt(
        &self,
        profile: &Profile,
        table: &MarketTable,
    ) -> Result<String, AdvisorError> {
        profile.validate()?;

        let country = &self.region.country;
        let mut prompt = String::with_capacity(2000);

        prompt.push_str(&format!(
            "As an expert real estate and financial advisor in {country}, create a \
             personalized real estate plan for {}.\n\n",
            profile.name
        ));

        prompt.push_str("**Client Profile:**\n");
        prompt.push_str(&format!("- Name: {}\n", profile.name));
        prompt.push_str(&format!("- Location: {}, {country}\n", profile.location));
        prompt.push_str(&format!(
            "- Annual Household Income: {}\n",
            self.format_amount(profile.income)
        ));
        prompt.push_str(&format!(
            "- Investment Timeframe: {} years\n\n",
            profile.timeframe_years
        ));

        prompt.push_str(&format!("**Current Market Data for {}:**\n", profile.location));
        prompt.push_str(&self.render_table(table));

        prompt.push_str("\n**Your Task:**\n");
        prompt.push_str(
            "Generate a friendly, encouraging, and clear advisory report in Markdown. \
             Include these sections:\n",
        );
        for (i, (title, detail)) in PLAN_SECTIONS.iter().enumerate() {
            prompt.push_str(&format!("{}. **{title}:** {detail}\n", i + 1));
        }
        prompt.push_str("Use bolding and bullet points for readability.\n");

        Ok(prompt)
    }

    /// Prompt answering a free-text question in the client's context.
    pub fn build_followup_prompt(
        &self,
        profile: &Profile,
        table: &MarketTable,
        question: &str,
    ) -> Result<String, AdvisorError> {
        profile.validate()?;

        let country = &self.region.country;
        let income = self.format_amount(profile.income);
        let mut prompt = String::with_capacity(2000);

        prompt.push_str(&format!(
            "You are a real estate and financial advisor AI for {country}. A user named {} \
             from {} with an annual income of {income} is asking a follow-up question.\n\n",
            profile.name, profile.location
        ));

        prompt.push_str("**User's Original Context:**\n");
        prompt.push_str(&format!("- Location: {}, {country}\n", profile.location));
        prompt.push_str(&format!("- Annual Income: {income}\n"));
        prompt.push_str(&format!("- Timeframe: {} years\n", profile.timeframe_years));
        prompt.push_str("- Market Data:\n");
        prompt.push_str(&self.render_table(table));

        prompt.push_str("\n**User's Question:**\n");
        prompt.push_str(&format!("\"{question}\"\n\n"));

        prompt.push_str("**Your Task:**\n");
        prompt.push_str(
            "Answer the user's question clearly and concisely, keeping their profile and \
             the provided market data in mind. Be helpful and professional.\n",
        );

        Ok(prompt)
    }

    /// Markdown pipe table with a stable column order.
    pub fn render_table(&self, table: &MarketTable) -> String {
        let symbol = &self.region.currency_symbol;
        let headers = [
            "Property Type".to_string(),
            "Area (sqft)".to_string(),
            format!("Land Price ({symbol}/sqft)"),
            format!("Construction Cost ({symbol}/sqft)"),
            format!("Ready Property Price ({symbol})"),
        ];

        let mut out = String::with_capacity(600);
        out.push_str(&format!("| {} |\n", headers.join(" | ")));
        out.push_str(&format!("|{}\n", "---|".repeat(headers.len())));
        for row in &table.rows {
            out.push_str(&format!("| {} |\n", render_cells(row).join(" | ")));
        }
        out
    }

    /// Currency amount with comma-grouped thousands and no decimals.
    pub fn format_amount(&self, amount: i64) -> String {
        format!("{}{}", self.region.currency_symbol, group_digits(amount))
    }
}

fn render_cells(row: &MarketRow) -> [String; 5] {
    let cell = |v: Option<u64>| v.map_or_else(|| NOT_APPLICABLE.to_string(), |n| n.to_string());
    [
        row.property_type.label().to_string(),
        row.area_sqft.to_string(),
        cell(row.land_price_per_sqft),
        cell(row.construction_cost_per_sqft),
        cell(row.ready_property_price),
    ]
}

/// `1234567` → `"1,234,567"`.
pub fn group_digits(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
