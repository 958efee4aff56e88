// src/faq.rs
//
// Keyword-overlap FAQ matcher. Bounded by catalogue size times question
// length; no external model is consulted.

pub struct Faq {
    pub question: &'static str,
    pub answer: &'static str,
}

pub const MATCH_THRESHOLD: f64 = 0.3;

const STOPWORDS: &[&str] = &[
    "what", "are", "you", "your", "do", "the", "a", "an", "is", "if", "how", "can", "i",
    "should", "will", "does", "have", "has", "had", "be", "been", "being", "get", "got",
    "provide", "offers", "offer", "to", "from", "of", "in", "on", "at", "by", "for", "with",
    "or", "and", "but", "not", "no", "yes", "my", "me", "him", "her", "them", "us", "we",
];

pub const FAQS: &[Faq] = &[
    Faq {
        question: "What are your clinic hours?",
        answer: "SmileCraft Dental is open Monday to Saturday from 9:00 AM to 7:00 PM. We are closed on Sundays.",
    },
    Faq {
        question: "Where is your clinic located?",
        answer: "SmileCraft Dental is centrally located for easy access. Please visit our Contact section on the website for the full address and Google Maps directions.",
    },
    Faq {
        question: "How can I book an appointment?",
        answer: "You can book an appointment directly through our website using the \"Book Appointment\" form, or you can call us during clinic hours.",
    },
    Faq {
        question: "Do you accept walk-in patients?",
        answer: "We recommend booking an appointment in advance, but we do accept walk-in patients based on availability.",
    },
    Faq {
        question: "Do you provide teeth cleaning services?",
        answer: "Yes, we offer professional teeth cleaning to remove plaque, tartar, and stains while improving overall oral health.",
    },
    Faq {
        question: "Do you offer teeth whitening?",
        answer: "Yes, we provide safe and effective professional teeth whitening treatments for a brighter smile.",
    },
    Faq {
        question: "Do you provide dental implants?",
        answer: "Yes, we offer high-quality dental implants to replace missing teeth with durable and natural-looking results.",
    },
    Faq {
        question: "Do you provide braces or orthodontic treatment?",
        answer: "Yes, we offer orthodontic treatments including braces to help align teeth and improve your smile.",
    },
    Faq {
        question: "Do you perform root canal treatment?",
        answer: "Yes, we perform root canal treatments to save infected teeth and relieve pain.",
    },
    Faq {
        question: "Do you offer cosmetic dentistry?",
        answer: "Yes, we provide cosmetic dentistry services such as veneers, smile makeovers, and aesthetic treatments.",
    },
    Faq {
        question: "How much does a dental check-up cost?",
        answer: "The cost of a dental check-up depends on the treatment required. Please contact us or book an appointment for detailed pricing information.",
    },
    Faq {
        question: "How much does teeth whitening cost?",
        answer: "Teeth whitening costs vary depending on the treatment type. Please contact our clinic for a personalized quote.",
    },
    Faq {
        question: "Do you offer payment plans?",
        answer: "Yes, we offer flexible payment options for selected treatments. Please speak with our staff for more details.",
    },
    Faq {
        question: "Do you handle dental emergencies?",
        answer: "Yes, we handle dental emergencies such as severe tooth pain, broken teeth, and infections. Please call us immediately if you have an urgent issue.",
    },
    Faq {
        question: "What should I do if I have severe tooth pain?",
        answer: "If you are experiencing severe tooth pain, please contact our clinic immediately. Avoid chewing on the affected side and seek professional care as soon as possible.",
    },
    Faq {
        question: "Do you treat children?",
        answer: "Yes, we provide dental care for children in a comfortable and friendly environment.",
    },
    Faq {
        question: "At what age should a child first visit the dentist?",
        answer: "A child should visit the dentist by their first birthday or when their first tooth appears.",
    },
    Faq {
        question: "How often should I visit the dentist?",
        answer: "It is recommended to visit the dentist every 6 months for regular check-ups and cleanings.",
    },
    Faq {
        question: "How can I maintain good oral hygiene?",
        answer: "Brush twice daily, floss regularly, avoid excessive sugar intake, and schedule routine dental check-ups.",
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct FaqAnswer {
    pub answer: String,
    pub matched_question: Option<&'static str>,
    pub score: f64,
}

fn keywords(s: &str) -> Vec<String> {
    s.split_whitespace()
        .map(|w| w.replace(['?', '.', ',', '!'], ""))
        .filter(|w| !w.is_empty() && !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Share of the visitor's keywords that overlap (substring either way)
/// with a keyword of `question`.
pub fn similarity(input: &str, question: &str) -> f64 {
    let s1 = input.trim().to_lowercase();
    let s2 = question.trim().to_lowercase();
    if s1 == s2 {
        return 1.0;
    }

    let k1 = keywords(&s1);
    let k2 = keywords(&s2);
    if k1.is_empty() || k2.is_empty() {
        return 0.0;
    }

    let common = k1
        .iter()
        .filter(|k| k2.iter().any(|q| q.contains(k.as_str()) || k.contains(q.as_str())))
        .count();

    common as f64 / k1.len() as f64
}

pub struct FaqResponder {
    catalogue: &'static [Faq],
    fallback: String,
}

impl FaqResponder {
    pub fn new(clinic_name: &str) -> Self {
        Self::with_catalogue(FAQS, clinic_name)
    }

    pub fn with_catalogue(catalogue: &'static [Faq], clinic_name: &str) -> Self {
        Self {
            catalogue,
            fallback: format!(
                "Thank you for contacting {clinic_name}. For detailed information, please call our clinic or book an appointment through our website."
            ),
        }
    }

    /// Best-scoring catalogue answer, or the fallback below the threshold.
    /// Ties keep the earlier entry.
    pub fn respond(&self, message: &str) -> FaqAnswer {
        let mut best: Option<&Faq> = None;
        let mut best_score = 0.0;

        for faq in self.catalogue {
            let score = similarity(message, faq.question);
            if score > best_score {
                best_score = score;
                best = Some(faq);
            }
        }

        match best {
            Some(faq) if best_score >= MATCH_THRESHOLD => FaqAnswer {
                answer: faq.answer.to_string(),
                matched_question: Some(faq.question),
                score: best_score,
            },
            _ => FaqAnswer {
                answer: self.fallback.clone(),
                matched_question: None,
                score: best_score,
            },
        }
    }
}
