//! 정적 안내 페이지 (홈, 소개, FAQ, 약관, 개인정보, 문의)

// region:    --- Imports
use crate::bidding::model::Category;
use crate::error::MarketResult;
use crate::format::{format_price, format_time_left};
use crate::validation::FieldErrors;
use crate::widgets::Notice;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

// endregion: --- Imports

#[derive(Debug, Clone, Serialize)]
pub struct Link {
    pub label: String,
    pub href: String,
}

fn link(label: impl Into<String>, href: impl Into<String>) -> Link {
    Link {
        label: label.into(),
        href: href.into(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub heading: &'static str,
    pub paragraphs: Vec<&'static str>,
}

fn section(heading: &'static str, paragraphs: &[&'static str]) -> Section {
    Section {
        heading,
        paragraphs: paragraphs.to_vec(),
    }
}

// region:    --- Home
#[derive(Debug, Clone, Serialize)]
pub struct FeaturedItem {
    pub title: &'static str,
    pub image_url: &'static str,
    pub current_price: i64,
    pub current_price_label: String,
    pub end_time: DateTime<Utc>,
    pub time_left: String,
    pub href: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryLink {
    pub name: Category,
    pub icon: &'static str,
    pub href: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Feature {
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub headline: &'static str,
    pub tagline: &'static str,
    pub hero_image_url: &'static str,
    pub hero_links: Vec<Link>,
    pub featured: Vec<FeaturedItem>,
    pub categories: Vec<CategoryLink>,
    pub features: Vec<Feature>,
}

// (제목, 이미지, 현재가, 종료까지 일수)
const FEATURED: [(&str, &str, i64, i64); 3] = [
    (
        "19th Century Brass Telescope",
        "https://images.unsplash.com/photo-1589182337358-2cb63099350c",
        1200,
        2,
    ),
    (
        "Antique Persian Carpet",
        "https://images.unsplash.com/photo-1600166898405-da9535204843",
        4500,
        3,
    ),
    (
        "Victorian Era Writing Desk",
        "https://images.unsplash.com/photo-1517705008128-361805f42e86",
        3200,
        1,
    ),
];

pub fn home(now: DateTime<Utc>) -> HomePage {
    let featured = FEATURED
        .iter()
        .map(|&(title, image_url, current_price, days)| {
            let end_time = now + Duration::days(days);
            FeaturedItem {
                title,
                image_url,
                current_price,
                current_price_label: format_price(current_price),
                end_time,
                time_left: format_time_left(end_time, now),
                href: "/auctions",
            }
        })
        .collect();

    HomePage {
        headline: "Reviving the Glory of the Past",
        tagline: "Discover unique antiques and artifacts from around the world. Bid on history, own a piece of the past.",
        hero_image_url: "https://images.unsplash.com/photo-1461360370896-922624d12aa1?auto=format&fit=crop&w=2000",
        hero_links: vec![link("Browse Auctions", "/auctions"), link("Start Selling", "/sell")],
        featured,
        categories: Category::ALL
            .iter()
            .map(|c| CategoryLink {
                name: *c,
                icon: c.icon(),
                href: format!("/auctions?category={}", c.as_str().to_lowercase()),
            })
            .collect(),
        features: vec![
            Feature {
                title: "Real-time Bidding",
                description: "Participate in live auctions with real-time updates and notifications.",
            },
            Feature {
                title: "Secure Transactions",
                description: "Every transaction is protected with bank-grade security measures.",
            },
            Feature {
                title: "Expert Verification",
                description: "All items are verified by our team of antique experts.",
            },
        ],
    }
}

// endregion: --- Home

// region:    --- Info Pages
#[derive(Debug, Clone, Serialize)]
pub struct InfoPage {
    pub title: &'static str,
    pub sections: Vec<Section>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<&'static str>,
}

pub fn about() -> InfoPage {
    InfoPage {
        title: "About MayaBazaar",
        sections: vec![
            section("Our Story", &["MayaBazaar was founded with a passion for preserving and sharing the rich heritage of antiques and artifacts. Our platform connects collectors, enthusiasts, and sellers from around the world, creating a vibrant marketplace for unique historical pieces."]),
            section("Our Mission", &["We strive to make the world of antiques accessible to everyone while ensuring the authenticity and quality of every item. Our expert verification process and secure bidding system provide a trustworthy platform for buyers and sellers alike."]),
            section(
                "Why Choose Us",
                &[
                    "Expert Verification: Every item is thoroughly verified by our team of antique experts.",
                    "Secure Transactions: Bank-grade security for all payments and personal information.",
                    "Global Community: Connect with collectors and sellers worldwide.",
                ],
            ),
        ],
        last_updated: None,
    }
}

pub fn terms() -> InfoPage {
    InfoPage {
        title: "Terms & Conditions",
        sections: vec![
            section("1. Acceptance of Terms", &["By accessing and using MayaBazaar, you agree to be bound by these Terms and Conditions and all applicable laws and regulations."]),
            section(
                "2. Auction Rules",
                &[
                    "2.1. All bids are final and binding.",
                    "2.2. The highest bid at the end of the auction period wins.",
                    "2.3. Buyers must complete payment within 48 hours of auction end.",
                    "2.4. Sellers must ship items within 5 business days of payment completion.",
                ],
            ),
            section(
                "3. User Responsibilities",
                &[
                    "3.1. Provide accurate and complete information.",
                    "3.2. Maintain the confidentiality of your account.",
                    "3.3. Not engage in fraudulent or deceptive practices.",
                ],
            ),
            section("4. Item Authenticity", &["Sellers must guarantee the authenticity of their items. MayaBazaar reserves the right to remove listings that violate our authenticity standards."]),
            section(
                "5. Fees & Payments",
                &[
                    "5.1. Platform fee: 5% of final sale price.",
                    "5.2. Payment processing fee: 2.9% + $0.30 per transaction.",
                    "5.3. All fees are non-refundable.",
                ],
            ),
            section("6. Dispute Resolution", &["Any disputes will be resolved through our mediation process. Users agree to cooperate in good faith to resolve any conflicts."]),
        ],
        last_updated: Some("March 1, 2024"),
    }
}

pub fn privacy() -> InfoPage {
    InfoPage {
        title: "Privacy Policy",
        sections: vec![
            section("Information We Collect", &["We collect information you provide directly to us, including name, email address, billing information, and any other information you choose to provide."]),
            section(
                "How We Use Your Information",
                &[
                    "To provide and maintain our Service",
                    "To notify you about changes to our Service",
                    "To provide customer support",
                    "To process transactions and send related information",
                    "To detect, prevent and address technical issues",
                ],
            ),
            section("Data Security", &["We implement appropriate security measures to protect against unauthorized access, alteration, disclosure, or destruction of your personal information."]),
            section("Cookies", &["We use cookies and similar tracking technologies to track activity on our Service and hold certain information to improve and analyze our Service."]),
            section("Third-Party Services", &["We may employ third-party companies and individuals to facilitate our Service, provide the Service on our behalf, or assist us in analyzing how our Service is used."]),
            section("Changes to This Policy", &["We may update our Privacy Policy from time to time. We will notify you of any changes by posting the new Privacy Policy on this page and updating the date below."]),
        ],
        last_updated: Some("March 1, 2024"),
    }
}

// endregion: --- Info Pages

// region:    --- FAQ
#[derive(Debug, Clone, Serialize)]
pub struct Faq {
    pub question: &'static str,
    pub answer: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct FaqPage {
    pub title: &'static str,
    pub faqs: Vec<Faq>,
    pub contact: Link,
}

const FAQS: [(&str, &str); 6] = [
    ("How do I place a bid?", "To place a bid, navigate to the auction item you're interested in and enter your bid amount. Make sure you're logged in and your bid is higher than the current highest bid."),
    ("How do I know if I won an auction?", "When you win an auction, you will receive an email notification. You can also check your account dashboard for updates on your winning bids."),
    ("What payment methods do you accept?", "We accept major credit cards, PayPal, and bank transfers. All payments are processed securely through our payment gateway."),
    ("How is shipping handled?", "Shipping is handled by the seller. Once payment is confirmed, the seller will arrange shipping and provide tracking information."),
    ("Are the items authenticated?", "Yes, all items are verified by our team of experts before being listed. We ensure authenticity and accurate descriptions."),
    ("What if I receive a damaged item?", "Contact our support team immediately with photos of the damage. We will work with the seller to resolve the issue or provide a refund."),
];

pub fn faq() -> FaqPage {
    FaqPage {
        title: "Frequently Asked Questions",
        faqs: FAQS
            .iter()
            .map(|&(question, answer)| Faq { question, answer })
            .collect(),
        contact: link("Contact our support team", "/contact"),
    }
}

// endregion: --- FAQ

// region:    --- Contact
#[derive(Debug, Clone, Serialize)]
pub struct ContactPage {
    pub title: &'static str,
    pub intro: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
    pub address: [&'static str; 2],
}

pub fn contact() -> ContactPage {
    ContactPage {
        title: "Get in Touch",
        intro: "Have questions about an item or need assistance? We're here to help!",
        email: "support@mayabazaar.com",
        phone: "+1 (555) 123-4567",
        address: ["123 Antique Street", "New York, NY 10001"],
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    pub fn validate(&self) -> MarketResult<()> {
        let mut errors = FieldErrors::new();
        errors.min_chars("name", &self.name, 2, "Name must be at least 2 characters");
        errors.email("email", &self.email);
        errors.min_chars("subject", &self.subject, 5, "Subject must be at least 5 characters");
        errors.min_chars("message", &self.message, 10, "Message must be at least 10 characters");
        errors.into_result()
    }
}

/// 문의 접수 (저장하지 않고 로그만 남김)
pub fn submit_contact(form: &ContactForm) -> MarketResult<Notice> {
    form.validate()?;
    info!(
        "{:<12} --> 문의 접수: from={}, subject={}",
        "Contact",
        form.email.trim(),
        form.subject.trim()
    );
    Ok(Notice::success("Message sent successfully!"))
}

// endregion: --- Contact

// endregion: --- Tests
