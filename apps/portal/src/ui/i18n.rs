//! Interface strings for the two supported languages.

use std::{fmt, str::FromStr};

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ar")]
    Arabic,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Arabic => "ar",
        }
    }

    pub fn is_rtl(self) -> bool {
        matches!(self, Self::Arabic)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "ar" | "arabic" => Ok(Self::Arabic),
            other => Err(format!("unsupported language '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Brand,
    NavHome,
    NavLogin,
    NavDashboard,
    NavCourses,
    NavTutor,
    Loading,
    ConnectionFailed,
    SessionExpired,
    RequestRejected,
    ServerError,
    UnexpectedResponse,
    UserId,
    AccessKey,
    SignIn,
    Connecting,
    Logout,
    KnowledgeBase,
    Grade12Files,
    Textbooks,
    Slides,
    ScannedResources,
    Assessment,
    AnswerPrompt,
    AnalyzeAndGrade,
    Analyzing,
    AiOnline,
    AiOffline,
    Courses,
    NoCourses,
    Tutor,
    Greeting,
    Recommendations,
    Progress,
    Welcome,
    ExploreCourses,
}

pub fn text(language: Language, key: Key) -> &'static str {
    match language {
        Language::English => english(key),
        Language::Arabic => arabic(key),
    }
}

fn english(key: Key) -> &'static str {
    match key {
        Key::Brand => "MetaLearn",
        Key::NavHome => "Home",
        Key::NavLogin => "Login",
        Key::NavDashboard => "Dashboard",
        Key::NavCourses => "Courses",
        Key::NavTutor => "Tutor",
        Key::Loading => "Loading...",
        Key::ConnectionFailed => "Connection Failed",
        Key::SessionExpired => "Session expired, please sign in again",
        Key::RequestRejected => "Request rejected",
        Key::ServerError => "Backend error",
        Key::UnexpectedResponse => "Unexpected response from backend",
        Key::UserId => "User ID",
        Key::AccessKey => "Access key",
        Key::SignIn => "Sign in",
        Key::Connecting => "Connecting...",
        Key::Logout => "Logout",
        Key::KnowledgeBase => "Knowledge Base",
        Key::Grade12Files => "Grade 12 Files",
        Key::Textbooks => "Textbooks",
        Key::Slides => "Slides",
        Key::ScannedResources => "System scanned {} resources.",
        Key::Assessment => "AI Assessment Simulation",
        Key::AnswerPrompt => "Type your answer with: grade <text>",
        Key::AnalyzeAndGrade => "Analyze & Grade",
        Key::Analyzing => "Analyzing...",
        Key::AiOnline => "AI: ONLINE",
        Key::AiOffline => "AI: OFFLINE",
        Key::Courses => "Courses",
        Key::NoCourses => "No courses yet.",
        Key::Tutor => "Virtual Tutor",
        Key::Greeting => "Greeting",
        Key::Recommendations => "Recommendations",
        Key::Progress => "Progress",
        Key::Welcome => "Welcome to the Platform",
        Key::ExploreCourses => "Explore courses: go courses",
    }
}

fn arabic(key: Key) -> &'static str {
    match key {
        Key::Brand => "ميتا ليرن",
        Key::NavHome => "الرئيسية",
        Key::NavLogin => "تسجيل الدخول",
        Key::NavDashboard => "لوحة التحكم",
        Key::NavCourses => "الدورات",
        Key::NavTutor => "المعلم الافتراضي",
        Key::Loading => "جاري التحميل...",
        Key::ConnectionFailed => "فشل الاتصال",
        Key::SessionExpired => "انتهت الجلسة، يرجى تسجيل الدخول مجددا",
        Key::RequestRejected => "تم رفض الطلب",
        Key::ServerError => "خطأ في الخادم",
        Key::UnexpectedResponse => "استجابة غير متوقعة من الخادم",
        Key::UserId => "رقم المستخدم",
        Key::AccessKey => "مفتاح الوصول",
        Key::SignIn => "تفعيل الدخول للنظام",
        Key::Connecting => "جاري الاتصال بالنواة...",
        Key::Logout => "تسجيل الخروج",
        Key::KnowledgeBase => "قاعدة المعرفة",
        Key::Grade12Files => "ملفات الصف 12",
        Key::Textbooks => "الكتب",
        Key::Slides => "العروض",
        Key::ScannedResources => "تم فحص {} مورد.",
        Key::Assessment => "محاكاة التقييم الذكي",
        Key::AnswerPrompt => "اكتب إجابتك: grade <النص>",
        Key::AnalyzeAndGrade => "تحليل وتقييم",
        Key::Analyzing => "جاري التحليل...",
        Key::AiOnline => "الذكاء الاصطناعي: متصل",
        Key::AiOffline => "الذكاء الاصطناعي: غير متصل",
        Key::Courses => "الدورات",
        Key::NoCourses => "لا توجد دورات بعد.",
        Key::Tutor => "المعلم الافتراضي",
        Key::Greeting => "الترحيب",
        Key::Recommendations => "التوصيات",
        Key::Progress => "التقدم",
        Key::Welcome => "مرحبا بك في المنصة",
        Key::ExploreCourses => "استكشف الدورات: go courses",
    }
}

/// Fills the single `{}` placeholder of a catalog entry.
pub fn format(language: Language, key: Key, value: impl fmt::Display) -> String {
    text(language, key).replacen("{}", &value.to_string(), 1)
}
