//! User-facing strings (Uzbek) and the inline keyboards built from them.
use crate::event::{CallbackAction, PanelAction};
use crate::model::SponsorChannel;
use crate::platform::{Button, Keyboard};
use crate::store::Stats;

pub const JOIN_TO_USE: &str = "📛 Botdan foydalanish uchun quyidagi kanallarga obuna bo'ling:";
pub const JOIN_TO_WATCH: &str = "📛 Filmni olishdan oldin quyidagi kanallarga obuna bo'ling:";
pub const JOIN_DONE_BUTTON: &str = "✅ Obuna bo'ldim";

pub const CODE_PROMPT: &str = "🎬 Qaysi film kerak? Raqam yuboring (masalan: 12)";
pub const WELCOME: &str =
    "👋 Assalomu alaykum! Botga xush kelibsiz!\n\n🎬 Film raqamini yuboring (masalan: 12)";
pub const CODE_PROMPT_AFTER_CHECK: &str = "🎬 Endi raqam yuboring (masalan: 12), filmni jo'nataman.";
pub const ADMIN_WELCOME: &str = "👋 Assalomu alaykum! Admin panelga xush kelibsiz!";
pub const ADMIN_PANEL: &str = "👋 Admin panelga xush kelibsiz!";

pub const SUBS_CONFIRMED: &str = "✅ Obuna tasdiqlandi!";
pub const SUBS_INCOMPLETE: &str = "🚫 Obuna hali to'liq emas!";
pub const ADMIN_ONLY: &str = "❌ Bu tugma faqat admin uchun!";

pub const NO_CODE_IN_CAPTION: &str = "⚠️ Izohda raqam topilmadi.";
pub const WRONG_CHANNEL: &str = "⚠️ Videoni noto'g'ri kanaldan forward qildingiz.";
pub const FORWARD_NOT_UPLOAD: &str = "⚠️ Videoni forward qiling. Yuklab emas!";
pub const VIDEO_NOT_FOUND: &str = "❌ Bu raqamga mos film topilmadi.";
pub const DELIVERY_FAILED: &str = "❌ Video yuborishda xatolik yuz berdi.";
pub const SAVE_FAILED: &str = "❌ Ma'lumotni saqlashda xatolik yuz berdi.";

pub const ADD_SPONSOR_USAGE: &str = "❗ Foydalanish: /homiy_qosh @kanal_username";
pub const REMOVE_SPONSOR_USAGE: &str = "❗ Foydalanish: /homiy_olib_tashla @kanal_username";
pub const BROADCAST_USAGE: &str = "✉️ Xabar yuborish uchun matn kiriting:\n/xabar_yubor Salom!";
pub const ADD_VIDEO_HINT: &str =
    "🎬 Media kanaldagi videoni shu yerga forward qiling. Izohida film raqami bo'lishi kerak.";
pub const SPONSOR_ADDED: &str = "✅ Homiy kanal qo'shildi.";
pub const SPONSOR_EXISTS: &str = "🔁 Bu kanal ro'yxatda bor.";
pub const SPONSOR_REMOVED: &str = "🗑 Homiy kanal o'chirildi.";
pub const SPONSOR_NOT_FOUND: &str = "❌ Bunday kanal topilmadi.";
pub const NO_SPONSORS: &str = "🚫 Hech qanday homiy kanal yo'q.";
pub const BACK_BUTTON: &str = "🔙 Orqaga";

pub fn video_saved(code: &str) -> String {
    format!("✅ {code}-raqamli video saqlandi.")
}

pub fn channel_id(chat_id: i64) -> String {
    format!("📢 Kanal ID: {chat_id}")
}

pub fn broadcast_done(sent: usize) -> String {
    format!("📬 {sent} ta foydalanuvchiga xabar yuborildi.")
}

pub fn sponsor_list(sponsors: &[SponsorChannel]) -> String {
    if sponsors.is_empty() {
        return NO_SPONSORS.to_string();
    }
    let lines: Vec<&str> = sponsors.iter().map(SponsorChannel::as_str).collect();
    format!("📋 Homiylar ro'yxati:\n{}", lines.join("\n"))
}

pub fn stats(stats: &Stats) -> String {
    format!(
        "📊 Bot statistikasi:\n\n👥 Foydalanuvchilar soni: {}\n🎬 Filmlar soni: {}\n📢 Homiylar soni: {}",
        stats.users, stats.videos, stats.sponsors
    )
}

/// One join button per sponsor, then the confirmation button.
pub fn join_keyboard(sponsors: &[SponsorChannel]) -> Keyboard {
    let mut kb = Keyboard::default();
    for channel in sponsors {
        kb = kb.row(vec![Button::url(
            format!("➕ {}", channel.display_name()),
            channel.join_link(),
        )]);
    }
    kb.row(vec![Button::callback(
        JOIN_DONE_BUTTON,
        CallbackAction::CheckSubs.as_str(),
    )])
}

fn panel_button(text: &str, action: PanelAction) -> Button {
    Button::callback(text, CallbackAction::Panel(action).as_str())
}

pub fn admin_panel() -> Keyboard {
    Keyboard::default()
        .row(vec![
            panel_button("➕ Homiy qo'shish", PanelAction::AddSponsor),
            panel_button("➖ Homiy o'chirish", PanelAction::RemoveSponsor),
        ])
        .row(vec![
            panel_button("📋 Homiylar ro'yxati", PanelAction::ListSponsors),
            panel_button("📢 Xabar yuborish", PanelAction::Broadcast),
        ])
        .row(vec![
            panel_button("📊 Statistika", PanelAction::Stats),
            panel_button("🎬 Video qo'shish", PanelAction::AddVideo),
        ])
}

pub fn back_to_admin() -> Keyboard {
    Keyboard::default().row(vec![panel_button(BACK_BUTTON, PanelAction::BackToAdmin)])
}
