use crate::models::Subject;

pub fn analysis_prompt(subject: Subject, question_text: &str, has_image: bool) -> String {
    let mut prompt = format!(
        "You are an experienced {subject} tutor reviewing a question a student got wrong.\n\
         Diagnose the most likely mistake, name the core concept being tested, \
         give a clear ordered solution, and write one new practice question on the \
         same concept with its answer and a short explanation.\n",
        subject = subject.label()
    );

    let text = question_text.trim();
    if !text.is_empty() {
        prompt.push_str("\nQuestion:\n");
        prompt.push_str(text);
        prompt.push('\n');
    }
    if has_image {
        prompt.push_str("\nThe attached photo shows the question");
        if !text.is_empty() {
            prompt.push_str(" and may include the student's working");
        }
        prompt.push_str(".\n");
    }

    prompt
}

pub fn vocabulary_prompt(topic: &str) -> String {
    format!(
        "Create between 5 and 8 English vocabulary flashcards for the topic \"{}\". \
         For each word give the IPA pronunciation, a concise definition suitable for \
         a secondary-school student, and one natural example sentence.",
        topic.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_prompt_mentions_subject_and_text() {
        let prompt = analysis_prompt(Subject::Chemistry, "  Balance H2 + O2  ", false);
        assert!(prompt.contains("Chemistry tutor"));
        assert!(prompt.contains("Balance H2 + O2\n"));
        assert!(!prompt.contains("photo"));
    }

    #[test]
    fn photo_only_prompt_skips_question_block() {
        let prompt = analysis_prompt(Subject::Math, "", true);
        assert!(!prompt.contains("Question:"));
        assert!(prompt.contains("attached photo shows the question.\n"));
    }
}
