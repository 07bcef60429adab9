//! Static content: session catalog, about page, profile extras

use serde::{Deserialize, Serialize};

/// A tutoring session a user can launch from the services screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOffer {
    pub id: String,
    pub subject: String,
    pub tutor: String,
    pub avatar: String,
    pub description: String,
}

struct OfferRow(&'static str, &'static str, &'static str, &'static str, &'static str);

const OFFERS: &[OfferRow] = &[
    OfferRow(
        "math-calculus",
        "Advanced Calculus",
        "Dr. MathBot Pro",
        "🤖",
        "Master derivatives, integrals, and advanced calculus concepts",
    ),
    OfferRow(
        "chemistry-organic",
        "Organic Chemistry",
        "Prof. ChemBot",
        "🧪",
        "Explore organic compounds, reactions, and molecular structures",
    ),
    OfferRow(
        "spanish-conversation",
        "Spanish Conversation",
        "Señora LinguaBot",
        "🗣",
        "Practice Spanish speaking and improve your fluency",
    ),
    OfferRow(
        "react-development",
        "React Development",
        "CodeMentor AI",
        "💻",
        "Learn modern React development and best practices",
    ),
    OfferRow(
        "digital-design",
        "Digital Design Basics",
        "ArtisticAI",
        "🎨",
        "Create stunning digital designs and learn design principles",
    ),
    OfferRow(
        "music-theory",
        "Music Theory Fundamentals",
        "MusicBot Maestro",
        "🎵",
        "Understand music theory, scales, and composition",
    ),
    OfferRow(
        "physics-quantum",
        "Quantum Physics",
        "Dr. QuantumBot",
        "⚛",
        "Dive into quantum mechanics and modern physics",
    ),
    OfferRow(
        "literature-analysis",
        "Literature Analysis",
        "Prof. LitBot",
        "📚",
        "Analyze classic and modern literature with expert guidance",
    ),
];

/// All launchable sessions, in display order
pub fn session_offers() -> Vec<SessionOffer> {
    OFFERS
        .iter()
        .map(|OfferRow(id, subject, tutor, avatar, description)| SessionOffer {
            id: id.to_string(),
            subject: subject.to_string(),
            tutor: tutor.to_string(),
            avatar: avatar.to_string(),
            description: description.to_string(),
        })
        .collect()
}

pub fn find_offer(id: &str) -> Option<SessionOffer> {
    session_offers().into_iter().find(|o| o.id == id)
}

pub struct Highlight {
    pub title: &'static str,
    pub description: &'static str,
}

pub struct Stat {
    pub number: &'static str,
    pub label: &'static str,
}

pub struct TeamMember {
    pub name: &'static str,
    pub role: &'static str,
    pub description: &'static str,
    pub expertise: &'static [&'static str],
}

pub struct Achievement {
    pub name: &'static str,
    pub description: &'static str,
    pub earned: bool,
}

pub struct SubjectProgress {
    pub name: &'static str,
    pub level: &'static str,
    pub sessions: u32,
}

pub const TAGLINE: &str = "We're revolutionizing education through AI-powered personalized tutoring, \
making quality learning accessible to everyone, everywhere.";

pub const HOME_FEATURES: &[Highlight] = &[
    Highlight {
        title: "1-on-1 AI Tutors",
        description: "Live video sessions with a tutor that adapts to how you learn.",
    },
    Highlight {
        title: "50+ Subjects",
        description: "From calculus to conversation practice, pick up where you left off.",
    },
    Highlight {
        title: "Always Available",
        description: "Tutors are online around the clock, start a session in seconds.",
    },
    Highlight {
        title: "Chat and Whiteboard",
        description: "Work through problems together with a shared chat and sketchpad.",
    },
];

pub const VALUES: &[Highlight] = &[
    Highlight {
        title: "Excellence",
        description: "We strive for the highest quality in AI tutoring technology and educational outcomes.",
    },
    Highlight {
        title: "Accessibility",
        description: "Making quality education accessible to everyone, regardless of background or location.",
    },
    Highlight {
        title: "Innovation",
        description: "Continuously advancing AI technology to create better learning experiences.",
    },
    Highlight {
        title: "Community",
        description: "Building a supportive learning community where everyone can thrive.",
    },
];

pub const STATS: &[Stat] = &[
    Stat { number: "500K+", label: "Students Helped" },
    Stat { number: "50+", label: "Subjects Covered" },
    Stat { number: "98%", label: "Satisfaction Rate" },
    Stat { number: "24/7", label: "Support Available" },
];

pub const TEAM: &[TeamMember] = &[
    TeamMember {
        name: "Dr. Sarah Chen",
        role: "CEO & Co-Founder",
        description: "Former Stanford AI researcher with 15 years in educational technology.",
        expertise: &["AI/ML", "Education", "Leadership"],
    },
    TeamMember {
        name: "Prof. Michael Rodriguez",
        role: "Chief Learning Officer",
        description: "Educational psychology expert and former university dean.",
        expertise: &["Psychology", "Curriculum", "Assessment"],
    },
    TeamMember {
        name: "Dr. Aisha Patel",
        role: "Head of AI Research",
        description: "PhD in Machine Learning, specializing in natural language processing.",
        expertise: &["NLP", "Deep Learning", "Research"],
    },
    TeamMember {
        name: "James Kim",
        role: "Head of Product",
        description: "Former Google product manager with expertise in educational platforms.",
        expertise: &["Product", "UX", "Strategy"],
    },
];

pub const ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        name: "First Session",
        description: "Completed your first tutoring session",
        earned: true,
    },
    Achievement {
        name: "Math Wizard",
        description: "Completed 10 math sessions",
        earned: true,
    },
    Achievement {
        name: "Science Explorer",
        description: "Completed 5 science sessions",
        earned: true,
    },
    Achievement {
        name: "Consistent Learner",
        description: "Completed sessions for 7 consecutive days",
        earned: false,
    },
    Achievement {
        name: "High Achiever",
        description: "Maintained 90%+ average for a month",
        earned: false,
    },
];

pub const SUBJECT_PROGRESS: &[SubjectProgress] = &[
    SubjectProgress { name: "Mathematics", level: "Advanced", sessions: 12 },
    SubjectProgress { name: "Science", level: "Intermediate", sessions: 8 },
    SubjectProgress { name: "Language", level: "Beginner", sessions: 4 },
];

pub fn earned_achievements() -> usize {
    ACHIEVEMENTS.iter().filter(|a| a.earned).count()
}
