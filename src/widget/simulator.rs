//! Offline canned replies used when no relay is configured.

struct CannedReply {
    keywords: &'static [&'static str],
    reply: &'static str,
}

// Checked in order; the first family with a hit wins.
const REPLIES: &[CannedReply] = &[
    CannedReply {
        keywords: &["hi", "hello", "hey", "greetings", "good morning", "good evening"],
        reply: "Hello! I'm Jayesh's portfolio assistant. Ask me about his experience, projects, or skills.",
    },
    CannedReply {
        keywords: &["who", "jayesh", "yourself", "introduce", "about him"],
        reply: "Jayesh Vishwakarma is an AI/ML developer specializing in Generative AI, RAG pipelines, and scalable enterprise architectures. He is currently building next-gen shopping assistants.",
    },
    CannedReply {
        keywords: &["skill", "skills", "stack", "tech", "technologies", "tools", "languages", "python"],
        reply: "His core stack is Python with Scikit-learn, Keras and TensorFlow, plus YOLOv8, OpenCV and MediaPipe for vision. For GenAI he builds RAG pipelines with LangChain and FAISS, and he ships FastAPI, PostgreSQL and Docker on Google Cloud.",
    },
    CannedReply {
        keywords: &["project", "projects", "built", "build", "fraud", "rag", "pagesense"],
        reply: "Highlights: an AI-driven fraud detection system (XGBoost + FastAPI, 0.9998 AUC), PageSense, a context-aware browser assistant using RAG, and a RAG-based document Q&A assistant that cut hallucinations by 23%.",
    },
    CannedReply {
        keywords: &["experience", "work", "job", "intern", "internship", "commplug", "education", "career"],
        reply: "He is an AI/ML Software Developer Intern at CommPlug Innovations (Sept 2025 - present), where he built a WhatsApp shopping assistant with Gemini and Django. He is also pursuing an integrated MCA at Acropolis Institute, Indore.",
    },
    CannedReply {
        keywords: &["contact", "email", "hire", "reach", "linkedin", "github", "available"],
        reply: "You can reach Jayesh at jayeshvishwakarma6028@gmail.com, on LinkedIn at linkedin.com/in/cmd-jayesh, or see his code at github.com/jayesh-cmd.",
    },
];

const DEFAULT_REPLY: &str =
    "I'm running in offline mode and can answer questions about Jayesh's experience, projects, skills, or how to contact him. Try asking about one of those!";

fn matches(lowered: &str, words: &[&str], keyword: &str) -> bool {
    if keyword.contains(' ') {
        lowered.contains(keyword)
    } else {
        words.iter().any(|w| *w == keyword)
    }
}

pub fn simulate_reply(text: &str) -> &'static str {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    REPLIES.iter()
        .find(|canned| canned.keywords.iter().any(|k| matches(&lowered, &words, k)))
        .map(|canned| canned.reply)
        .unwrap_or(DEFAULT_REPLY)
}
