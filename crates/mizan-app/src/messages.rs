//! Arabic user-facing texts for prompts and notices.

fn label_ar(label: &str) -> &'static str {
    match label {
        "employee" => "الموظف",
        "project" => "المشروع",
        "bank account" => "الحساب البنكي",
        "cash account" => "الصندوق",
        "bank transaction" => "العملية البنكية",
        _ => "السجل",
    }
}

pub fn confirm_toggle(label: &str, activating: bool) -> String {
    let verb = if activating { "تفعيل" } else { "إلغاء تفعيل" };
    format!("هل تريد {} {}؟", verb, label_ar(label))
}

pub fn confirm_delete(label: &str) -> String {
    format!(
        "سيتم حذف {} نهائياً ولا يمكن التراجع عن ذلك. هل أنت متأكد؟",
        label_ar(label)
    )
}

pub fn toggled(label: &str, activated: bool) -> String {
    let verb = if activated { "تفعيل" } else { "إلغاء تفعيل" };
    format!("تم {} {} بنجاح", verb, label_ar(label))
}

pub fn deleted(label: &str) -> String {
    format!("تم حذف {} نهائياً", label_ar(label))
}

pub fn delete_active(label: &str) -> String {
    format!(
        "لا يمكن حذف {} وهو نشط، يرجى إلغاء تفعيله أولاً",
        label_ar(label)
    )
}

pub fn saved(label: &str, created: bool) -> String {
    let verb = if created { "إضافة" } else { "تحديث" };
    format!("تم {} {} بنجاح", verb, label_ar(label))
}

pub fn save_failed(label: &str, detail: &str) -> String {
    format!("تعذر حفظ {}: {}", label_ar(label), detail)
}

pub fn action_failed(detail: &str) -> String {
    format!("حدث خطأ: {detail}")
}

pub fn unscoped_rows() -> String {
    "يتم عرض سجلات جميع الشركات بدون تصفية".to_string()
}
