//! User-facing text for lookup results, in the Markdown flavour chat clients render.

use crate::lookup::{FieldStats, QueryResult, Summary};

pub const INVALID_QUERY_PROMPT: &str = "Пожалуйста, введите корректный запрос.";
const NO_DATA: &str = "нет данных";

/// Prints whole numbers with one decimal ("3.0") and everything else as is.
fn number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

fn records_word(count: usize) -> &'static str {
    if count == 1 {
        "запись"
    } else {
        "записи"
    }
}

fn stats_lines(stats: &FieldStats, unit: &str) -> (String, String) {
    match stats {
        FieldStats::Available { min, median, max } => (
            format!("*{}{}*", number(*median), unit),
            format!("от *{}{}* до *{}{}*", number(*min), unit, number(*max), unit),
        ),
        FieldStats::NoNumericData => (NO_DATA.to_owned(), NO_DATA.to_owned()),
    }
}

fn render_summary(query: &str, summary: &Summary) -> String {
    let (price_median, price_range) = stats_lines(&summary.property, " млн ₽");
    let (tarif_median, tarif_range) = stats_lines(&summary.tarif, "%");
    let insurance_type = summary.insurance_type_mode.as_deref().unwrap_or(NO_DATA);
    let insurer = summary.insurer_mode.as_deref().unwrap_or(NO_DATA);

    format!(
        "🔍 *Результаты по запросу:* _\"{query}\"_\n\
         \n\
         📄 Найдено *{count}* {records} о таком предмете лизинга.\n\
         \n\
         💰 *Цена объекта лизинга:*\n\
         • Медианная цена: {price_median}\n\
         • Диапазон: {price_range}\n\
         \n\
         🛡 *Страховой тариф:*\n\
         • Медианный тариф: {tarif_median}\n\
         • Диапазон: {tarif_range}\n\
         \n\
         🏷 Чаще всего этот предмет лизинга страхуется как: *\"{insurance_type}\"*\n\
         🏢 Чаще всего этот предмет лизинга страхуется в страховой компании: *\"{insurer}\"*\n",
        query = query,
        count = summary.records_count,
        records = records_word(summary.records_count),
        price_median = price_median,
        price_range = price_range,
        tarif_median = tarif_median,
        tarif_range = tarif_range,
        insurance_type = insurance_type,
        insurer = insurer,
    )
}

pub fn render_result(result: &QueryResult) -> String {
    match result {
        QueryResult::NotFound { query } => {
            format!("Предмет лизинга '{}' не найден в нашей базе данных.", query)
        }
        QueryResult::Found { query, summary } => render_summary(query, summary),
    }
}

pub fn welcome_phrase(records: usize) -> String {
    format!(
        "Вы можете поискать данные о страховании лизинга. Сейчас в базе {} записей об объектах. Введите запрос.",
        records
    )
}

pub fn help_text() -> String {
    let commands = [
        "/start — приветствие",
        "/help — список команд",
        "Отправьте название предмета лизинга — получите информацию из базы",
    ];
    format!("Доступные команды:\n{}", commands.join("\n"))
}
