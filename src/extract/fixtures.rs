//! Real PDFs built with lopdf's writer for backend and pipeline tests.

use lopdf::content::{Content, Operation};
use lopdf::encryption::{decrypt_object, get_encryption_key};
use lopdf::{Document, Object, Stream, dictionary};

const PASSWORD_PADDING: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01,
    0x08, 0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53,
    0x69, 0x7A,
];

/// One page per entry; each string becomes its own BT..ET text object.
pub(crate) fn build_pdf(pages: &[&[&str]]) -> Vec<u8> {
    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();
    let font_id = document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids = Vec::<Object>::new();
    for text_objects in pages {
        let mut operations = Vec::new();
        for (index, text) in text_objects.iter().enumerate() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
            operations.push(Operation::new(
                "Td",
                vec![72.into(), (720 - 20 * index as i64).into()],
            ));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = document.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content stream"),
        ));
        let page_id = document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);

    save(&mut document)
}

/// Re-saves `bytes` under the standard security handler (RC4, 40-bit key,
/// revision 2). An empty `user_password` gives an owner-password-only file
/// that any reader can open.
pub(crate) fn encrypt_pdf(bytes: &[u8], user_password: &str) -> Vec<u8> {
    let mut document = Document::load_mem(bytes).expect("load fixture");
    let file_id = Object::string_literal(b"vistoria-fixture".to_vec());
    document.trailer.set("ID", vec![file_id.clone(), file_id]);

    let encrypt_id = document.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "O" => Object::string_literal(vec![0x4F_u8; 32]),
        "P" => -44,
    });
    document.trailer.set("Encrypt", encrypt_id);

    let key = get_encryption_key(&document, user_password, false).expect("derive key");
    document
        .get_object_mut(encrypt_id)
        .and_then(Object::as_dict_mut)
        .expect("encryption dictionary")
        .set("U", Object::string_literal(rc4(&key, &PASSWORD_PADDING)));

    // RC4 is symmetric, so the decrypting helper also encrypts.
    for (&id, object) in document.objects.iter_mut() {
        if id == encrypt_id {
            continue;
        }
        let Ok(encrypted) = decrypt_object(&key, id, object) else {
            continue;
        };
        match object {
            Object::Stream(stream) => stream.set_content(encrypted),
            Object::String(content, _) => *content = encrypted,
            _ => {}
        }
    }

    save(&mut document)
}

fn save(document: &mut Document) -> Vec<u8> {
    let mut buffer = Vec::new();
    document.save_to(&mut buffer).expect("save pdf");
    buffer
}

fn rc4(key: &[u8], input: &[u8]) -> Vec<u8> {
    let mut state = (0..=255).collect::<Vec<u8>>();
    let mut j = 0_u8;
    for i in 0..256 {
        j = j.wrapping_add(state[i]).wrapping_add(key[i % key.len()]);
        state.swap(i, j as usize);
    }

    let (mut i, mut j) = (0_u8, 0_u8);
    input
        .iter()
        .map(|byte| {
            i = i.wrapping_add(1);
            j = j.wrapping_add(state[i as usize]);
            state.swap(i as usize, j as usize);
            byte ^ state[state[i as usize].wrapping_add(state[j as usize]) as usize]
        })
        .collect()
}
