//! 文本修复服务 - 业务能力层
//!
//! 转换器输出常带有编码损坏（UTF-8 被当作 latin-1 读取、`?` 替换字符），
//! 不修复的话子串匹配会静默失效

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// 常见的双重编码字符
const MOJIBAKE: &[(&str, &str)] = &[
    ("\u{c3}\u{a1}", "á"),
    ("\u{c3}\u{a9}", "é"),
    ("\u{c3}\u{ad}", "í"),
    ("\u{c3}\u{b3}", "ó"),
    ("\u{c3}\u{ba}", "ú"),
    ("\u{c3}\u{b1}", "ñ"),
    ("\u{c3}\u{2018}", "Ñ"),
    ("\u{c3}\u{bc}", "ü"),
    ("\u{c3}\u{153}", "Ü"),
    ("\u{c2}\u{bf}", "¿"),
    ("\u{c2}\u{a1}", "¡"),
];

/// 重音字符被替换成 `?` 的常见词（按顺序应用，忽略大小写）
const QUESTION_MARK_WORDS: &[(&str, &str)] = &[
    (r"\?Qu\?", "¿Qué"),
    (r"\?Cu\?l", "¿Cuál"),
    (r"\?C\?mo", "¿Cómo"),
    (r"Constituci\?n", "Constitución"),
    (r"Espa\?a", "España"),
    (r"espa\?ol", "español"),
    (r"art\?culo", "artículo"),
    (r"jur\?dic", "jurídic"),
    (r"pol\?tic", "polític"),
    (r"p\?blic", "públic"),
    (r"administraci\?n", "administración"),
    (r"funci\?n", "función"),
    (r"disposici\?n", "disposición"),
    (r"regulaci\?n", "regulación"),
    (r"organizaci\?n", "organización"),
    (r"informaci\?n", "información"),
    (r"decisi\?n", "decisión"),
    (r"comisi\?n", "comisión"),
    (r"sesi\?n", "sesión"),
    (r"relaci\?n", "relación"),
    (r"resoluci\?n", "resolución"),
    (r"Monarqu\?a", "Monarquía"),
    (r"democr\?tic", "democrátic"),
    (r"a\?o", "año"),
    (r"seg\?n", "según"),
    (r"ser\?", "será"),
    (r"est\?", "está"),
    (r"podr\?", "podrá"),
    (r"deber\?", "deberá"),
    (r"tendr\?", "tendrá"),
    (r"m\?s", "más"),
    (r"tambi\?n", "también"),
    (r"d\?a", "día"),
    (r"t\?tulo", "título"),
    (r"pre\?mbulo", "preámbulo"),
    (r"aut\?nom", "autónom"),
    (r"\?rgano", "órgano"),
    (r"car\?cter", "carácter"),
    (r"per\?odo", "período"),
    (r"mayor\?a", "mayoría"),
    (r"minor\?a", "minoría"),
    (r"antig\?edad", "antigüedad"),
];

static QUESTION_MARK_RES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    QUESTION_MARK_WORDS
        .iter()
        .map(|(pattern, replacement)| {
            let re = Regex::new(&format!("(?i){}", pattern)).expect("constant pattern");
            (re, *replacement)
        })
        .collect()
});

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// 修复编码损坏
///
/// 1. latin-1 往返：整段文本若是被误读的 UTF-8，直接还原
/// 2. 替换常见的双重编码字符，删除 U+FFFD
/// 3. 修复 `?` 替换了重音字符的常见词，保留首字母大小写
pub fn repair_encoding(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    if let Some(fixed) = latin1_roundtrip(text) {
        return fixed;
    }

    let mut out = text.to_string();
    for (broken, fixed) in MOJIBAKE {
        if out.contains(broken) {
            out = out.replace(broken, fixed);
        }
    }
    out.retain(|c| c != '\u{fffd}');

    if out.contains('?') {
        for (re, replacement) in QUESTION_MARK_RES.iter() {
            out = re
                .replace_all(&out, |caps: &Captures| match_first_letter_case(&caps[0], replacement))
                .into_owned();
        }
    }

    out
}

/// 用于规则匹配的规范化文本：修复编码后转小写
pub fn normalize_for_matching(text: &str) -> String {
    repair_encoding(text).to_lowercase()
}

/// 清理文本：去掉控制字符、合并连续空白、去掉首尾空白
pub fn clean_text(text: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(text, " ");
    collapsed
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

fn latin1_roundtrip(text: &str) -> Option<String> {
    if text.is_ascii() {
        return None;
    }
    let bytes = text
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect::<Option<Vec<u8>>>()?;
    let decoded = String::from_utf8(bytes).ok()?;
    (decoded != text).then_some(decoded)
}

fn match_first_letter_case(matched: &str, replacement: &str) -> String {
    let upper = matched
        .chars()
        .find(|c| c.is_alphabetic())
        .is_some_and(|c| c.is_uppercase());

    let mut out = String::with_capacity(replacement.len());
    let mut first = true;
    for c in replacement.chars() {
        if first && c.is_alphabetic() {
            if upper {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            first = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_misread_is_restored() {
        // "Constitución" 的 UTF-8 字节被逐字节读成 latin-1
        let broken: String = "Constitución".bytes().map(char::from).collect();
        assert_eq!(repair_encoding(&broken), "Constitución");
    }

    #[test]
    fn correct_text_is_unchanged() {
        let text = "¿Cuál es la forma política del Estado?";
        assert_eq!(repair_encoding(text), text);
    }

    #[test]
    fn question_mark_words_keep_first_letter_case() {
        assert_eq!(
            repair_encoding("La Constituci?n Espa?ola"),
            "La Constitución Española"
        );
        assert_eq!(repair_encoding("seg?n el art?culo 1"), "según el artículo 1");
        assert_eq!(repair_encoding("?Qu? d?a?"), "¿Qué día?");
    }

    #[test]
    fn replacement_char_is_removed() {
        assert_eq!(repair_encoding("Art\u{fffd}culo"), "Artculo");
    }

    #[test]
    fn mixed_mojibake_is_replaced() {
        // 同时含有 U+2018，latin-1 往返失败，走逐个替换
        let text = "ESPA\u{c3}\u{2018}A y la funci\u{c3}\u{b3}n \u{2018}p\u{fa}blica\u{2019}";
        assert_eq!(repair_encoding(text), "ESPAÑA y la función ‘pública’");
    }

    #[test]
    fn clean_text_collapses_whitespace_and_controls() {
        assert_eq!(clean_text("  uno\t\tdos\n tres\u{7}  "), "uno dos tres");
        assert_eq!(clean_text(""), "");
    }
}
