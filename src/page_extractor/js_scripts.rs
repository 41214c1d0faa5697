//! JavaScript evaluation scripts
//!
//! Evaluated in the admin tab. The snapshot script never throws: failures
//! are returned as `{ kind: 'error' }` so the Rust side always receives data.

/// Capture the list rows or the editor fields of the current admin page
pub const SNAPSHOT_SCRIPT: &str = r#"
    (() => {
        const notes = [];
        const valueOf = (selector) => {
            const el = document.querySelector(selector);
            return el && typeof el.value === 'string' ? el.value : null;
        };

        try {
            const pageUrl = window.location.href;

            if (!pageUrl.includes('post.php')) {
                const rows = Array.from(document.querySelectorAll(
                    'tr.type-post, tr.status-draft, tr.status-pending, tr.status-future'
                )).map(row => {
                    const checkbox = row.querySelector('input[name="post[]"]');
                    const link = row.querySelector('.row-title');
                    const date = row.querySelector('.date');
                    return {
                        classes: row.className || '',
                        id: checkbox ? checkbox.value : null,
                        title: link ? link.textContent.trim() : null,
                        href: link ? link.href : null,
                        date: date ? date.textContent.trim() : null
                    };
                });
                return { kind: 'list', pageUrl, rows, notes };
            }

            let blockEditorContent = null;
            try {
                if (typeof wp !== 'undefined' && wp.data && wp.data.select('core/editor')) {
                    blockEditorContent = wp.data.select('core/editor').getEditedPostContent();
                }
            } catch (e) {
                notes.push('block editor: ' + e.message);
            }

            let classicEditorContent = null;
            try {
                if (typeof tinymce !== 'undefined' && tinymce.activeEditor) {
                    classicEditorContent = tinymce.activeEditor.getContent();
                }
            } catch (e) {
                notes.push('classic editor: ' + e.message);
            }

            const acfPresent = typeof acf !== 'undefined';
            const acfFields = [];
            if (acfPresent) {
                try {
                    document.querySelectorAll('.acf-field').forEach(field => {
                        const name = field.getAttribute('data-name');
                        if (!name) return;

                        const input = field.querySelector(
                            'input[type="text"], input[type="number"], textarea'
                        );

                        let wysiwyg = null;
                        const wrap = field.querySelector('.acf-editor-wrap');
                        if (wrap) {
                            const editorId = wrap.getAttribute('data-editor');
                            if (editorId && typeof tinymce !== 'undefined' && tinymce.get(editorId)) {
                                wysiwyg = tinymce.get(editorId).getContent();
                            } else {
                                const textarea = field.querySelector('textarea');
                                if (textarea) wysiwyg = textarea.value;
                            }
                        }

                        const select = field.querySelector('select');
                        const checked = field.querySelector(
                            'input[type="checkbox"]:checked, input[type="radio"]:checked'
                        );
                        const image = field.querySelector('.acf-image-uploader img');

                        acfFields.push({
                            name,
                            text: input ? input.value : null,
                            wysiwyg,
                            select: select ? select.value : null,
                            checked: checked ? checked.value : null,
                            image: image ? image.src : null
                        });
                    });
                } catch (e) {
                    notes.push('custom fields: ' + e.message);
                }
            }

            const featured = document.querySelector('#postimagediv img');
            const permalink = document.querySelector('#sample-permalink a');

            return {
                kind: 'single',
                pageUrl,
                notes,
                editor: {
                    postId: valueOf('#post_ID'),
                    title: valueOf('#title'),
                    blockEditorContent,
                    classicEditorContent,
                    textareaContent: valueOf('#content'),
                    yoastMeta: valueOf('#yoast_wpseo_metadesc'),
                    rankMathMeta: valueOf('input[name="rank_math_description"]'),
                    aioseoMeta: valueOf('textarea[name="aioseo_description"]'),
                    excerpt: valueOf('#excerpt'),
                    yoastRedirect: valueOf('input[name="yoast_wpseo_redirect"]'),
                    rankMathRedirect: valueOf('input[name="rank_math_redirection_url_to"]'),
                    simple301Redirect: valueOf('input[name="_301_redirect_url"]'),
                    status: valueOf('#post_status'),
                    permalink: permalink ? permalink.href : null,
                    featuredImage: featured ? { src: featured.src, alt: featured.alt || '' } : null,
                    acfPresent,
                    acfFields
                }
            };
        } catch (e) {
            return {
                kind: 'error',
                message: String((e && e.message) || e),
                stack: e && e.stack ? String(e.stack) : null
            };
        }
    })()
"#;
