/// Sentence boundary strategy for transcripts without inline timestamps.
///
/// Supplied at `Segmenter` construction so callers can plug in a
/// language-specific tokenizer; nothing here may touch the network.
pub trait SentenceSplitter: Send + Sync {
    fn split(&self, text: &str) -> Vec<String>;
}

/// Default splitter: a run of terminal punctuation (`.` `!` `?`) followed by
/// whitespace closes a sentence. A trailing fragment without terminal
/// punctuation still counts as a sentence, so no transcript text is dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct RuleSentenceSplitter;

impl SentenceSplitter for RuleSentenceSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut current = String::new();
        let mut at_terminal = false;

        for ch in text.chars() {
            if at_terminal && ch.is_whitespace() {
                let sentence = current.trim();
                if !sentence.is_empty() {
                    sentences.push(sentence.to_owned());
                }
                current.clear();
                at_terminal = false;
                continue;
            }
            at_terminal = matches!(ch, '.' | '!' | '?');
            current.push(ch);
        }

        let sentence = current.trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_owned());
        }
        sentences
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_terminal_punctuation() {
        let split = RuleSentenceSplitter.split("Hello world. How are you? Great!");
        assert_eq!(split, vec!["Hello world.", "How are you?", "Great!"]);
    }

    #[test]
    fn keeps_trailing_fragment() {
        let split = RuleSentenceSplitter.split("First one. and then a trailer");
        assert_eq!(split, vec!["First one.", "and then a trailer"]);
    }

    #[test]
    fn punctuation_inside_a_token_is_not_a_boundary() {
        let split = RuleSentenceSplitter.split("v1.2 shipped today. Nice!");
        assert_eq!(split, vec!["v1.2 shipped today.", "Nice!"]);
    }

    #[test]
    fn collapses_punctuation_runs() {
        let split = RuleSentenceSplitter.split("What?! Really?? Yes.");
        assert_eq!(split, vec!["What?!", "Really??", "Yes."]);
    }

    #[test]
    fn empty_input_yields_no_sentences() {
        assert!(RuleSentenceSplitter.split("").is_empty());
        assert!(RuleSentenceSplitter.split("   \n  ").is_empty());
    }
}
