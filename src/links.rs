//! External reference links shown next to each match.

use crate::core::CandidateRecord;

const SEARCH_BASE: &str = "https://www.google.com/search?q=";
const WIKIPEDIA_BASE: &str = "https://ja.wikipedia.org/wiki/";

/// Web search for "<name> <party>"
pub fn search_url(candidate: &CandidateRecord) -> String {
    let query = if candidate.party.is_empty() {
        candidate.name.clone()
    } else {
        format!("{} {}", candidate.name, candidate.party)
    };
    format!("{}{}", SEARCH_BASE, urlencoding::encode(&query))
}

/// Encyclopedia article for the candidate on the default wiki
pub fn wikipedia_url(candidate: &CandidateRecord) -> String {
    wiki_url(WIKIPEDIA_BASE, candidate)
}

/// Encyclopedia article under a custom wiki base such as `https://en.wikipedia.org/wiki/`
pub fn wiki_url(base: &str, candidate: &CandidateRecord) -> String {
    let title = candidate.name.trim().replace(' ', "_");
    format!("{}{}", base, urlencoding::encode(&title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StanceVector;

    #[test]
    fn test_search_url_encodes() {
        let c = CandidateRecord::new("Sato Ken", "Green & Co", "", StanceVector::new());
        assert_eq!(
            search_url(&c),
            "https://www.google.com/search?q=Sato%20Ken%20Green%20%26%20Co"
        );
    }

    #[test]
    fn test_wiki_url() {
        let c = CandidateRecord::new("山田 太郎", "", "", StanceVector::new());
        assert_eq!(
            wikipedia_url(&c),
            "https://ja.wikipedia.org/wiki/%E5%B1%B1%E7%94%B0_%E5%A4%AA%E9%83%8E"
        );
        assert_eq!(
            wiki_url("https://en.wikipedia.org/wiki/", &CandidateRecord::new("Ann Lee", "", "", StanceVector::new())),
            "https://en.wikipedia.org/wiki/Ann_Lee"
        );
    }
}
