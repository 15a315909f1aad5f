//! Readers for TREC tagged documents and topic files.

use lazy_static::lazy_static;
use regex::Regex;

pub const UNKNOWN: &str = "UNKNOWN";

lazy_static! {
    static ref DOC_RE: Regex = Regex::new(r"(?s)<DOC>(.*?)</DOC>").expect("valid regex");
    static ref DOCNO_RE: Regex = Regex::new(r"<DOCNO>\s*(.*?)\s*</DOCNO>").expect("valid regex");
    static ref HT_RE: Regex = Regex::new(r"<HT>\s*(.*?)\s*</HT>").expect("valid regex");
    static ref HEADER_RE: Regex = Regex::new(r"(?s)<HEADER>(.*?)</HEADER>").expect("valid regex");
    static ref TEXT_RE: Regex = Regex::new(r"(?s)<TEXT>(.*?)</TEXT>").expect("valid regex");
    static ref TOP_RE: Regex = Regex::new(r"(?s)<top>(.*?)</top>").expect("valid regex");
    static ref NUM_RE: Regex = Regex::new(r"<num>([^<]*)").expect("valid regex");
    static ref TITLE_RE: Regex = Regex::new(r"<title>([^<]*)").expect("valid regex");
    static ref WS_RE: Regex = Regex::new(r"\s+").expect("valid regex");
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrecDoc {
    pub docno: String,
    pub ht: String,
    pub header: String,
    pub text: String,
}

impl TrecDoc {
    /// The scored field: header followed by body text.
    pub fn contents(&self) -> String {
        format!("{} {}", self.header, self.text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Topic {
    pub num: String,
    pub title: String,
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str().to_string())
}

fn parse_doc(block: &str) -> TrecDoc {
    TrecDoc {
        docno: capture(&DOCNO_RE, block).unwrap_or_else(|| UNKNOWN.to_string()),
        ht: capture(&HT_RE, block).unwrap_or_else(|| UNKNOWN.to_string()),
        header: capture(&HEADER_RE, block).unwrap_or_default(),
        text: capture(&TEXT_RE, block).unwrap_or_default(),
    }
}

/// Split a file into documents. A file without `<DOC>` wrappers is one document.
pub fn parse_documents(content: &str) -> Vec<TrecDoc> {
    let blocks: Vec<&str> = DOC_RE
        .captures_iter(content)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    if blocks.is_empty() {
        return vec![parse_doc(content)];
    }
    blocks.into_iter().map(parse_doc).collect()
}

/// Read `<top>` entries, keeping topics that have both a number and a title.
pub fn parse_topics(content: &str) -> Vec<Topic> {
    let mut topics = Vec::new();
    for cap in TOP_RE.captures_iter(content) {
        let body = &cap[1];
        let num = capture(&NUM_RE, body).map(|n| clean(&n, "Number:"));
        let title = capture(&TITLE_RE, body).map(|t| clean(&t, "Topic:"));
        match (num, title) {
            (Some(num), Some(title)) if !num.is_empty() => topics.push(Topic { num, title }),
            _ => tracing::warn!(entry = %body.trim(), "skipping topic without num/title"),
        }
    }
    topics
}

fn clean(raw: &str, prefix: &str) -> String {
    let s = unescape(raw.trim());
    let s = s.strip_prefix(prefix).unwrap_or(&s);
    WS_RE.replace_all(s.trim(), " ").into_owned()
}

fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_documents() {
        let src = "<DOC>\n<DOCNO> FBIS3-1 </DOCNO>\n<HT> \"cr00000011094001\" </HT>\n<HEADER>\nPOLITICAL ISSUES\n</HEADER>\n<TEXT>\nMinisters met today.\n</TEXT>\n</DOC>\n<DOC>\n<DOCNO>FBIS3-2</DOCNO>\n<TEXT>second</TEXT>\n</DOC>";
        let docs = parse_documents(src);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].docno, "FBIS3-1");
        assert_eq!(docs[0].ht, "\"cr00000011094001\"");
        assert!(docs[0].contents().contains("POLITICAL ISSUES"));
        assert!(docs[0].contents().contains("Ministers met today."));
        assert_eq!(docs[1].ht, UNKNOWN);
        assert_eq!(docs[1].header, "");
    }

    #[test]
    fn unwrapped_file_is_single_document() {
        let docs = parse_documents("<TEXT>just text</TEXT>");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].docno, UNKNOWN);
        assert_eq!(docs[0].text, "just text");
    }

    #[test]
    fn parses_xml_topics() {
        let src = "<topics>\n<top>\n<num>301</num>\n<title>International Organized Crime</title>\n</top>\n<top><num>302</num><title>Poliomyelitis &amp; Post-Polio</title></top>\n</topics>";
        let topics = parse_topics(src);
        assert_eq!(topics, vec![
            Topic { num: "301".into(), title: "International Organized Crime".into() },
            Topic { num: "302".into(), title: "Poliomyelitis & Post-Polio".into() },
        ]);
    }

    #[test]
    fn parses_classic_topics() {
        let src = "<top>\n<num> Number: 351\n<title> Falkland petroleum\nexploration\n\n<desc> Description:\nWhat is known?\n</top>";
        let topics = parse_topics(src);
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].num, "351");
        assert_eq!(topics[0].title, "Falkland petroleum exploration");
    }
}
