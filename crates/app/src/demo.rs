use quiz_core::model::{BilingualText, Grade, OptionLetter, Question, QuestionId};
use storage::InMemoryRepository;

type Entry = (&'static str, &'static str, [&'static str; 4], OptionLetter);

const SAMPLE: [Entry; 3] = [
    (
        "Which planet is known as the Red Planet?",
        "किस ग्रह को लाल ग्रह कहा जाता है?",
        ["Venus", "Mars", "Jupiter", "Mercury"],
        OptionLetter::B,
    ),
    (
        "How many days are there in a leap year?",
        "लीप वर्ष में कितने दिन होते हैं?",
        ["365", "364", "366", "360"],
        OptionLetter::C,
    ),
    (
        "What is the capital of India?",
        "भारत की राजधानी क्या है?",
        ["New Delhi", "Mumbai", "Kolkata", "Chennai"],
        OptionLetter::A,
    ),
];

/// Offline backend serving the same small set for every grade.
pub fn repository() -> InMemoryRepository {
    let mut repo = InMemoryRepository::new();
    let mut next_id = 1_u64;
    for grade in Grade::ALL {
        let mut set = Vec::with_capacity(SAMPLE.len());
        for (en, hi, options, key) in SAMPLE {
            let question = Question::new(
                QuestionId::new(next_id),
                BilingualText::new(en, hi),
                options.map(|text| BilingualText::new(text, text)),
            );
            set.push((question, key));
            next_id += 1;
        }
        repo = repo.with_question_set(grade, set);
    }
    repo
}
